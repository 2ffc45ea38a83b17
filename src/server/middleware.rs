use crate::config::{RequestSecrets, API_KEY_VAR};
use crate::error::{AppError, CredentialFault};
use crate::modality::chat::ir::ChatRequest;

/// Every Anthropic API key starts with this.
pub const API_KEY_PREFIX: &str = "sk-ant-api";

/// A request that passed the gate.
#[derive(Debug, Clone)]
pub struct AdmittedRequest {
    pub api_key: String,
    pub model: String,
    pub request: ChatRequest,
}

/// Check the credential, then parse the body. Nothing here touches the
/// network.
pub fn admit(secrets: &RequestSecrets, body: &[u8]) -> Result<AdmittedRequest, AppError> {
    let api_key = check_credential(secrets)?.to_string();
    let request = parse_request(body)?;
    let model = secrets.resolve_model(request.model_name.as_deref());
    Ok(AdmittedRequest {
        api_key,
        model,
        request,
    })
}

pub fn check_credential(secrets: &RequestSecrets) -> Result<&str, AppError> {
    let api_key = secrets.api_key.as_deref().filter(|k| !k.is_empty());
    log::debug!("API key present: {}", api_key.is_some());

    let Some(api_key) = api_key else {
        log::error!("{} missing from environment", API_KEY_VAR);
        return Err(AppError::Credential {
            fault: CredentialFault::Missing,
            message: format!("{} not found in environment variables.", API_KEY_VAR),
            details: format!("Set {} in the server environment and restart.", API_KEY_VAR),
        });
    };

    let well_formed = api_key.starts_with(API_KEY_PREFIX);
    log::debug!("API key format valid: {}", well_formed);

    if !well_formed {
        log::error!("Invalid {} format", API_KEY_VAR);
        return Err(AppError::Credential {
            fault: CredentialFault::Malformed,
            message: format!(
                "Invalid {} format - should start with {}",
                API_KEY_VAR, API_KEY_PREFIX
            ),
            details: format!(
                "Verify the key in the Anthropic console. Configured key begins with: {}",
                mask_key(api_key)
            ),
        });
    }

    Ok(api_key)
}

pub fn parse_request(body: &[u8]) -> Result<ChatRequest, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("request body is empty".into()));
    }
    Ok(serde_json::from_slice(body)?)
}

fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(10).collect();
    format!("{}...", prefix)
}
