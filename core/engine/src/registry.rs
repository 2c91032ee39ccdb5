//! FILENAME: core/engine/src/registry.rs
//! PURPOSE: The catalog of callable functions and their metadata.
//! CONTEXT: Names are canonicalized to uppercase on both registration and
//! lookup. Registering a name that already exists replaces the earlier
//! descriptor in place, so listing order stays stable across overrides.

use crate::error::EvaluationError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type FunctionResult = Result<Value, EvaluationError>;

/// A function body. Shared so descriptors (and the engine holding them) stay
/// cheap to clone and safe to use from several threads.
pub type FunctionImpl = Arc<dyn Fn(&[Value]) -> FunctionResult + Send + Sync>;

// ============================================================================
// METADATA TYPES
// ============================================================================

/// Grouping used by function palettes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    String,
    Math,
    Statistical,
    Logical,
    Date,
    Financial,
    Utility,
    /// Any caller-defined grouping.
    Custom(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::String => "string",
            Category::Math => "math",
            Category::Statistical => "statistical",
            Category::Logical => "logical",
            Category::Date => "date",
            Category::Financial => "financial",
            Category::Utility => "utility",
            Category::Custom(name) => name,
        }
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" => Category::String,
            "math" => Category::Math,
            "statistical" => Category::Statistical,
            "logical" => Category::Logical,
            "date" => Category::Date,
            "financial" => Category::Financial,
            "utility" => Category::Utility,
            other => Category::Custom(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category::from(name.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory result kind shown in tooling. Not enforced at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    Number,
    String,
    Boolean,
    Date,
    Any,
}

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    Fixed(usize),
    /// At least this many arguments.
    Variadic(usize),
    /// Trailing parameters between `min` and `max` are optional.
    Range { min: usize, max: usize },
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Fixed(n) => count == n,
            Arity::Variadic(min) => count >= min,
            Arity::Range { min, max } => count >= min && count <= max,
        }
    }

    pub fn min(&self) -> usize {
        match *self {
            Arity::Fixed(n) | Arity::Variadic(n) => n,
            Arity::Range { min, .. } => min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "exactly {}", n),
            Arity::Variadic(min) => write!(f, "at least {}", min),
            Arity::Range { min, max } => write!(f, "between {} and {}", min, max),
        }
    }
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// Metadata plus implementation for one callable function.
#[derive(Clone, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub category: Category,
    pub signature: String,
    pub description: String,
    pub example: String,
    pub return_type: ReturnType,
    pub arity: Arity,
    /// Number of placeholders in the autocomplete snippet.
    pub parameter_count: usize,
    #[serde(skip)]
    implementation: FunctionImpl,
}

impl FunctionDescriptor {
    /// Creates a descriptor with placeholder metadata. The name is stored
    /// uppercase; use the `with_*` methods to fill in the rest.
    pub fn new<F>(name: impl Into<String>, arity: Arity, implementation: F) -> Self
    where
        F: Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    {
        let name = name.into().to_uppercase();
        FunctionDescriptor {
            signature: format!("{}(...)", name),
            name,
            category: Category::Custom("custom".to_string()),
            description: String::new(),
            example: String::new(),
            return_type: ReturnType::Any,
            arity,
            parameter_count: arity.min(),
            implementation: Arc::new(implementation),
        }
    }

    pub fn with_category(mut self, category: impl Into<Category>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn with_return_type(mut self, return_type: ReturnType) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_parameter_count(mut self, count: usize) -> Self {
        self.parameter_count = count;
        self
    }

    /// Invokes the implementation. Arity is the caller's responsibility.
    pub fn call(&self, args: &[Value]) -> FunctionResult {
        (self.implementation)(args)
    }

    /// Autocomplete snippet, e.g. `MID(parameter1, parameter2, parameter3)`.
    pub fn insert_text(&self) -> String {
        let params: Vec<String> = (1..=self.parameter_count)
            .map(|i| format!("parameter{}", i))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("signature", &self.signature)
            .field("arity", &self.arity)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FunctionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.category == other.category
            && self.signature == other.signature
            && self.description == other.description
            && self.example == other.example
            && self.return_type == other.return_type
            && self.arity == other.arity
            && self.parameter_count == other.parameter_count
            && Arc::ptr_eq(&self.implementation, &other.implementation)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Uppercase name -> descriptor, in registration order.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: Vec<FunctionDescriptor>,
    index: HashMap<String, usize>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the full built-in catalog.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtins::register_builtins(&mut registry);
        registry
    }

    /// Adds a descriptor, replacing any existing one with the same name.
    /// Returns the replaced descriptor.
    pub fn register(&mut self, mut descriptor: FunctionDescriptor) -> Option<FunctionDescriptor> {
        descriptor.name = descriptor.name.to_uppercase();
        match self.index.get(&descriptor.name) {
            Some(&slot) => Some(std::mem::replace(&mut self.functions[slot], descriptor)),
            None => {
                self.index
                    .insert(descriptor.name.clone(), self.functions.len());
                self.functions.push(descriptor);
                None
            }
        }
    }

    pub fn register_all(&mut self, descriptors: impl IntoIterator<Item = FunctionDescriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.index
            .get(&name.to_uppercase())
            .map(|&slot| &self.functions[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_uppercase())
    }

    pub fn list_all(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    /// Descriptors whose category name matches, ignoring case.
    pub fn by_category(&self, category: &str) -> Vec<&FunctionDescriptor> {
        self.functions
            .iter()
            .filter(|f| f.category.as_str().eq_ignore_ascii_case(category))
            .collect()
    }

    /// Distinct categories in the order they first appear.
    pub fn categories(&self) -> Vec<&Category> {
        let mut seen: Vec<&Category> = Vec::new();
        for function in &self.functions {
            if !seen.contains(&&function.category) {
                seen.push(&function.category);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
