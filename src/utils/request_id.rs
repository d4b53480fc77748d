use uuid::Uuid;

pub const REQUEST_ID_PREFIX: &str = "REQ-";

/// 生成抽奖请求 ID (REQ- + 8 位十六进制)
pub fn generate_request_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{REQUEST_ID_PREFIX}{}", &uuid[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_id() {
        let id = generate_request_id();
        assert_eq!(id.len(), REQUEST_ID_PREFIX.len() + 8);
        assert!(id.starts_with(REQUEST_ID_PREFIX));
        assert!(
            id[REQUEST_ID_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_hexdigit())
        );
    }

    #[test]
    fn test_generate_multiple_ids() {
        let id1 = generate_request_id();
        let id2 = generate_request_id();
        assert_ne!(id1, id2);
    }
}
