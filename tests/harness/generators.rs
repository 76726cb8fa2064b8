// SPDX-FileCopyrightText: 2026 T.S Plumbing
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A submission the validator accepts.
pub fn valid_submission() -> Value {
    json!({
        "name": "ישראל ישראלי",
        "phone": "0501234567",
        "projectType": "residential",
        "description": "בדיקה של טופס אינסטלציה",
    })
}

/// Phone numbers the form must accept.
pub fn valid_phones() -> Vec<&'static str> {
    vec![
        "0501234567",
        "050-123-4567",
        "050 123 4567",
        "02-1234567",
        "021234567",
        "03 123 4567",
    ]
}

/// Phone numbers the form must reject.
pub fn invalid_phones() -> Vec<&'static str> {
    vec![
        "050",
        "123456789",
        "1501234567",
        "050-1234-56789",
        "050--1234567",
        "050_123_4567",
        "+972-50-1234567",
        "050123456a",
        " 0501234567",
        "0501234567\n",
        "٠٥٠١٢٣٤٥٦٧",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }
}
