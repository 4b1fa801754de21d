/// Stores a value under a key.
///
/// Args:
///     key: Where to store the value.
#[document_me]
pub fn store(key: &str, value: Value) {
    let _ = (key, value);
}
