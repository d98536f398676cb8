//! Deterministic identifiers for model variables and constraints.
//!
//! Names are built from the project, person and role strings themselves.
//! ASCII alphanumerics pass through unchanged and every other byte is written
//! as `_xx` (lower-case hex), so two different inputs never share a name and
//! the output is valid in LP files. Segments are joined with `__`.

use std::fmt::Write as _;

const SEPARATOR: &str = "__";

pub fn encode_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "_{:02x}", byte);
        }
    }
    encoded
}

fn join(prefix: &str, segments: &[&str]) -> String {
    let mut name = String::from(prefix);
    for segment in segments {
        name.push_str(SEPARATOR);
        name.push_str(&encode_segment(segment));
    }
    name
}

pub fn allocation_var(project: &str, person: &str) -> String {
    join("alloc", &[project, person])
}

pub fn project_capacity(project: &str) -> String {
    join("project_cap", &[project])
}

pub fn person_capacity(person: &str) -> String {
    join("person_cap", &[person])
}

pub fn override_zero(project: &str, person: &str) -> String {
    join("override_zero", &[project, person])
}

pub fn override_minimum(project: &str, person: &str) -> String {
    join("override_min", &[project, person])
}

pub fn role_minimum(project: &str, role: &str) -> String {
    join("role_min", &[project, role])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(allocation_var("Apollo", "Ana"), "alloc__Apollo__Ana");
        assert_eq!(role_minimum("P1", "Engineer"), "role_min__P1__Engineer");
    }

    #[test]
    fn test_special_characters_are_escaped() {
        assert_eq!(encode_segment("R&D Team"), "R_26D_20Team");
        assert_eq!(encode_segment("a_b"), "a_5fb");
        assert_eq!(encode_segment("é"), "_c3_a9");
    }

    #[test]
    fn test_names_do_not_collide() {
        // 簡單字元替換下這些組合會撞名
        assert_ne!(allocation_var("a b", "c"), allocation_var("a_b", "c"));
        assert_ne!(allocation_var("a", "b__c"), allocation_var("a__b", "c"));
        assert_ne!(allocation_var("ab", "c"), allocation_var("a", "bc"));
    }

    #[test]
    fn test_names_are_stable() {
        let first = override_zero("Project X", "Person Y");
        let second = override_zero("Project X", "Person Y");
        assert_eq!(first, second);
        assert_eq!(first, "override_zero__Project_20X__Person_20Y");
    }
}
