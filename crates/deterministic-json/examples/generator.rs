use deterministic_json::{deserialize, Digest, Indent, Serializer};

fn main() {
    let event = r#"{
        "payload": {"value": 42, "tags": ["b", "a"]},
        "occurred_at": "2025-12-20T00:00:00Z",
        "event_type": "example"
    }"#;

    let value = match deserialize(event) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("parse failed: {}", err);
            std::process::exit(1);
        }
    };

    match Serializer::new().indent(Indent::Spaces(2)).serialize(&value) {
        Ok(text) => println!("{}", text),
        Err(err) => {
            eprintln!("serialization failed: {}", err);
            std::process::exit(1);
        }
    }

    match Digest::of(&value) {
        Ok(digest) => println!("sha-256: {}", digest.b64),
        Err(err) => {
            eprintln!("digest failed: {}", err);
            std::process::exit(1);
        }
    }
}
