use super::ir::OutputChunk;

/// Plain text carried by one backend chunk. Message chunks yield their string
/// content, or every text-typed part joined with no separator; all other
/// chunks yield an empty string.
pub fn extract_text(chunk: &OutputChunk) -> String {
    match chunk {
        OutputChunk::Message { content } => content.joined_text(),
        OutputChunk::Metadata(_) => String::new(),
    }
}
