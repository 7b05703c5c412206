//! Editing rules for a single predicate declaration.
//!
//! Which value types exist, which tokenizers and directives each of them accepts, and
//! how a descriptor is turned into an alter operation.

use std::fmt::Write;

use super::codec::type_expr;
use super::PredicateDescriptor;
use crate::models::AlterOp;

/// Scalar value types a predicate can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Default,
    Bool,
    DateTime,
    Float,
    Geo,
    Int,
    Password,
    String,
    Uid,
}

impl ValueType {
    pub const ALL: [ValueType; 9] = [
        ValueType::Default,
        ValueType::Bool,
        ValueType::DateTime,
        ValueType::Float,
        ValueType::Geo,
        ValueType::Int,
        ValueType::Password,
        ValueType::String,
        ValueType::Uid,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Default => "default",
            ValueType::Bool => "bool",
            ValueType::DateTime => "datetime",
            ValueType::Float => "float",
            ValueType::Geo => "geo",
            ValueType::Int => "int",
            ValueType::Password => "password",
            ValueType::String => "string",
            ValueType::Uid => "uid",
        }
    }

    /// Tokenizers that may appear in `@index(...)`.
    pub fn tokenizers(&self) -> &'static [&'static str] {
        match self {
            ValueType::Bool => &["bool"],
            ValueType::DateTime => &["year", "month", "day", "hour"],
            ValueType::Float => &["float"],
            ValueType::Geo => &["geo"],
            ValueType::Int => &["int"],
            ValueType::String => &["exact", "hash", "term", "fulltext", "trigram"],
            ValueType::Default | ValueType::Password | ValueType::Uid => &[],
        }
    }

    pub fn allows_list(&self) -> bool {
        *self != ValueType::Password
    }

    pub fn allows_reverse(&self) -> bool {
        !matches!(
            self,
            ValueType::Password | ValueType::Default | ValueType::Geo | ValueType::DateTime
        )
    }

    pub fn allows_count(&self) -> bool {
        !matches!(self, ValueType::Password | ValueType::Default)
    }

    pub fn allows_lang(&self) -> bool {
        *self == ValueType::String
    }

    pub fn allows_upsert(&self) -> bool {
        !matches!(self, ValueType::Password | ValueType::Bool | ValueType::Uid)
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A way in which a descriptor breaks the editing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    EmptyName,
    ReservedName(String),
    UnknownType(String),
    TokenizerNotAllowed { value_type: String, tokenizer: String },
    DirectiveNotAllowed { value_type: String, directive: &'static str },
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleViolation::EmptyName => write!(f, "predicate name is empty"),
            RuleViolation::ReservedName(name) => write!(f, "predicate {} is reserved", name),
            RuleViolation::UnknownType(t) => write!(f, "unknown value type {}", t),
            RuleViolation::TokenizerNotAllowed {
                value_type,
                tokenizer,
            } => write!(f, "tokenizer {} is not allowed on {}", tokenizer, value_type),
            RuleViolation::DirectiveNotAllowed {
                value_type,
                directive,
            } => write!(f, "@{} is not allowed on {}", directive, value_type),
        }
    }
}

impl PredicateDescriptor {
    /// Change the value type, clearing tokenizers and every directive the new type
    /// cannot carry.
    pub fn retype(&mut self, value_type: ValueType) {
        self.value_type = value_type.as_str().to_string();
        self.indices.clear();
        self.is_list &= value_type.allows_list();
        self.has_reverse &= value_type.allows_reverse();
        self.has_count &= value_type.allows_count();
        self.has_lang &= value_type.allows_lang();
        self.has_upsert &= value_type.allows_upsert();
    }

    /// Add the tokenizer if absent, remove it if present.
    pub fn toggle_tokenizer(&mut self, tokenizer: &str) {
        match self.indices.iter().position(|t| t == tokenizer) {
            Some(pos) => {
                self.indices.remove(pos);
            }
            None => self.indices.push(tokenizer.to_string()),
        }
    }

    /// Check the descriptor against the editing rules, reporting every violation.
    pub fn validate(&self) -> Result<(), Vec<RuleViolation>> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push(RuleViolation::EmptyName);
        } else if self.is_reserved() {
            violations.push(RuleViolation::ReservedName(self.name.clone()));
        }

        let Some(value_type) = ValueType::parse(&self.value_type) else {
            violations.push(RuleViolation::UnknownType(self.value_type.clone()));
            return Err(violations);
        };

        for tokenizer in &self.indices {
            if !value_type.tokenizers().contains(&tokenizer.as_str()) {
                violations.push(RuleViolation::TokenizerNotAllowed {
                    value_type: self.value_type.clone(),
                    tokenizer: tokenizer.clone(),
                });
            }
        }

        let directives = [
            ("list", self.is_list, value_type.allows_list()),
            ("reverse", self.has_reverse, value_type.allows_reverse()),
            ("count", self.has_count, value_type.allows_count()),
            ("lang", self.has_lang, value_type.allows_lang()),
            ("upsert", self.has_upsert, value_type.allows_upsert()),
        ];
        for (directive, set, allowed) in directives {
            if set && !allowed {
                violations.push(RuleViolation::DirectiveNotAllowed {
                    value_type: self.value_type.clone(),
                    directive,
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Full declaration, including `@count` and `@upsert`.
    pub fn declaration(&self) -> String {
        let mut line = format!("<{}>: {}", self.name, type_expr(self));
        if !self.indices.is_empty() {
            let _ = write!(line, " @index({})", self.indices.join(", "));
        }
        if self.has_lang {
            line.push_str(" @lang");
        }
        if self.has_reverse {
            line.push_str(" @reverse");
        }
        if self.has_count {
            line.push_str(" @count");
        }
        if self.has_upsert {
            line.push_str(" @upsert");
        }
        line.push_str(" .");
        line
    }

    /// Validated alter submitting this single declaration.
    pub fn to_alter(&self) -> Result<AlterOp, Vec<RuleViolation>> {
        self.validate()?;
        Ok(AlterOp::new(self.declaration()))
    }
}
