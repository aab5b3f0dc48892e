//! Base/extension composition
//!
//! `Extended<B, E>` owns a base object and an extension value. Capability
//! traits of the base are implemented on the wrapper by explicit forwarding,
//! so the base always answers for them. Extension members are reached
//! through `Deref` or [`Extended::extension`]. A wrapper that needs to
//! replace a base operation defines an inherent method of the same name,
//! which method resolution picks before any trait method.

use std::ops::Deref;

/// A base object composed with extension behaviour
#[derive(Debug, Clone)]
pub struct Extended<B, E> {
    base: B,
    extension: E,
}

impl<B, E> Extended<B, E> {
    pub fn new(base: B, extension: E) -> Self {
        Self { base, extension }
    }

    /// The wrapped object
    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }
}

impl<B, E> Deref for Extended<B, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.extension
    }
}

impl<B, E> AsRef<B> for Extended<B, E> {
    fn as_ref(&self) -> &B {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> String;
    }

    struct Person {
        name: String,
        age: u32,
    }

    impl Named for Person {
        fn name(&self) -> String {
            self.name.clone()
        }
    }

    struct Alias {
        name: String,
    }

    impl Alias {
        fn name(&self) -> String {
            self.name.clone()
        }

        fn greet(&self) -> &'static str {
            "Hello!"
        }

        fn add(&self, x: i32) -> i32 {
            10 + x
        }
    }

    impl<B: Named, E> Named for Extended<B, E> {
        fn name(&self) -> String {
            self.base().name()
        }
    }

    fn john_and_jane() -> Extended<Person, Alias> {
        Extended::new(
            Person {
                name: "John".to_string(),
                age: 30,
            },
            Alias {
                name: "Jane".to_string(),
            },
        )
    }

    #[test]
    fn test_base_wins_over_extension() {
        let composed = john_and_jane();
        assert_eq!(composed.name(), "John");
        assert_eq!(composed.extension().name(), "Jane");
    }

    #[test]
    fn test_extension_only_members_are_reachable() {
        let composed = Extended::new(
            (),
            Alias {
                name: "Jane".to_string(),
            },
        );
        assert_eq!(composed.greet(), "Hello!");
        assert_eq!(composed.add(5), 15);
    }

    #[test]
    fn test_base_fields_stay_reachable() {
        let composed = john_and_jane();
        assert_eq!(composed.base().age, 30);
        assert_eq!(composed.as_ref().age, 30);
    }
}
