/// Short random identifier, 9 lowercase hex characters.
pub fn new_short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(9);
    id
}

/// Generates ids until one is found that `taken` does not reject.
pub fn new_unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = new_short_id();
        if !taken(&id) {
            return id;
        }
        tracing::debug!("Generated id {} already taken, retrying", id);
    }
}
