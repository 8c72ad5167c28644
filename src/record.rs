use chrono::{DateTime, Utc};

use crate::identity::RecordIdentity;

/// A single journal record as produced by the stream collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub identity: RecordIdentity,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Record {
    pub fn new(identity: RecordIdentity, text: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            identity,
            text,
            timestamp,
        }
    }

    pub fn timestamp_utc(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Id128;

    #[test]
    fn test_timestamp_formatting() {
        let record = Record::new(
            RecordIdentity::new(Id128::ZERO, 0),
            "hello".to_string(),
            DateTime::from_timestamp(86_400, 0).unwrap(),
        );
        assert_eq!(record.timestamp_utc(), "1970-01-02 00:00:00");
    }
}
