use sha2::{Digest, Sha256};
use ulid::Ulid;

pub const REQUEST_ID_PREFIX: &str = "req-";

pub fn request_id() -> String {
    format!("{}{}", REQUEST_ID_PREFIX, Ulid::new())
}

pub fn session_id() -> String {
    format!("s_{}", Ulid::new())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
