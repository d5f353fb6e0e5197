//! snake_case to PascalCase / camelCase conversion used for generated class
//! and field names.
//!
//! Unlike `heck`, word boundaries are *only* underscores: every other
//! character is lowercased, so `userAccount` becomes `Useraccount`.

pub trait ToPascalCase {
    fn to_pascal_case(&self) -> String;
}

pub trait ToCamelCase {
    fn to_camel_case(&self) -> String;
}

impl ToPascalCase for str {
    fn to_pascal_case(&self) -> String {
        transform_case(self)
    }
}

impl ToCamelCase for str {
    fn to_camel_case(&self) -> String {
        let pascal = transform_case(self);
        let mut chars = pascal.chars();

        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

fn transform_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut next_upper = true;

    for c in s.chars() {
        if c == '_' {
            next_upper = true;
        } else if next_upper {
            result.extend(c.to_uppercase());
            next_upper = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }

    result
}
