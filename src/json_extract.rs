use serde_json::Value;

use crate::entities::error::BwError;

/// Locates the first JSON object embedded in free-form model output.
///
/// Scans forward over every `{` and attempts a streaming parse from that
/// offset; the first offset yielding a valid object wins and trailing prose
/// is ignored. A `{` inside narrative text that does not open valid JSON is
/// skipped instead of corrupting the match.
pub fn extract_json(raw: &str) -> Result<Value, BwError> {
    for (index, _) in raw.char_indices().filter(|(_, character)| *character == '{') {
        let mut stream = serde_json::Deserializer::from_str(&raw[index..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            if value.is_object() {
                return Ok(value);
            }
        }
    }
    Err(BwError::extraction("응답에서 JSON 객체를 찾을 수 없습니다."))
}
