//! Types module
//!
//! The logical language is typed with a small system built from three shapes:
//!
//! - Primitive types (`e`, `t`, ...), optionally placed under a parent primitive to
//!   express subtyping (for instance a numeral type `i` under the entity type `e`).
//! - Function types `<a,b>` from a domain to a range.
//! - Array types `t*`, used for variadic domains such as conjunction `<t*,t>`.
//!
//! A [`TypeRepository`] maps names to types. Complex declarations may refer to any
//! previously declared name, so repositories are built in declaration order, usually
//! from a TOML types file (see [`TypeRepository::load_from_toml`]).
use std::{collections::BTreeMap, fmt, path::Path, sync::Arc};

use log::{debug, info};
use serde::Deserialize;
use strum::EnumIs;

use crate::error::{LogicError, LogicResult};

pub mod comparator;
pub mod parser;

/// A named primitive type with an optional parent primitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimitiveType {
    name: Arc<str>,
    parent: Option<Arc<PrimitiveType>>,
}

impl PrimitiveType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&PrimitiveType> {
        self.parent.as_deref()
    }

    /// Returns `true` if `self` is `other` or one of its descendants.
    pub fn is_subtype_of(&self, other: &PrimitiveType) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty.name == other.name {
                return true;
            }
            current = ty.parent();
        }
        false
    }
}

/// A type of the logical language.
///
/// Equality is structural; names given in a [`TypeRepository`] are aliases only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs)]
pub enum Type {
    Primitive(Arc<PrimitiveType>),
    Function(Arc<Type>, Arc<Type>),
    Array(Arc<Type>),
}

impl Type {
    #[inline]
    pub fn function(domain: Type, range: Type) -> Self {
        Type::Function(Arc::new(domain), Arc::new(range))
    }

    #[inline]
    pub fn array(element: Type) -> Self {
        Type::Array(Arc::new(element))
    }

    /// Domain of a function type.
    pub fn domain(&self) -> Option<&Type> {
        match self {
            Type::Function(domain, _) => Some(domain),
            _ => None,
        }
    }

    /// Range of a function type.
    pub fn range(&self) -> Option<&Type> {
        match self {
            Type::Function(_, range) => Some(range),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(primitive) => write!(f, "{}", primitive.name),
            Type::Function(domain, range) => write!(f, "<{domain},{range}>"),
            Type::Array(element) => write!(f, "{element}*"),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PrimitiveDecl {
    name: String,
    #[serde(default)]
    parent: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ComplexDecl {
    name: String,
    definition: String,
}

/// On-disk layout of a types file.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TypesFile {
    entity: String,
    truth: String,
    #[serde(default)]
    numeral: Option<String>,
    #[serde(default)]
    primitive: Vec<PrimitiveDecl>,
    #[serde(default)]
    complex: Vec<ComplexDecl>,
}

/// Name-indexed store of the types available to expressions.
///
/// Example:
/// ```rust
/// # use dlformal::types::TypeRepository;
/// let mut repo = TypeRepository::new("e", "t");
/// repo.declare_complex("u", "<e,t>").unwrap();
/// let u = repo.get_type("u").unwrap();
/// assert_eq!(repo.unfold_type(u), "<e,t>");
/// assert_eq!(repo.name_of(u), Some("u"));
/// ```
#[derive(Debug, Clone)]
pub struct TypeRepository {
    types: BTreeMap<String, Type>,
    // Declaration order, used to pick the canonical alias of a structure.
    declared: Vec<String>,
    entity: Type,
    truth: Type,
    numeral: Option<Type>,
}

impl TypeRepository {
    /// Create a repository holding only the entity and truth primitives.
    pub fn new(entity: &str, truth: &str) -> Self {
        let entity_ty = Self::make_primitive(entity, None);
        let truth_ty = Self::make_primitive(truth, None);
        let mut repo = Self {
            types: BTreeMap::new(),
            declared: Vec::new(),
            entity: entity_ty.clone(),
            truth: truth_ty.clone(),
            numeral: None,
        };
        repo.insert(entity.to_string(), entity_ty);
        if truth != entity {
            repo.insert(truth.to_string(), truth_ty);
        }
        repo
    }

    fn make_primitive(name: &str, parent: Option<Arc<PrimitiveType>>) -> Type {
        Type::Primitive(Arc::new(PrimitiveType {
            name: name.into(),
            parent,
        }))
    }

    fn insert(&mut self, name: String, ty: Type) {
        debug!("Declared type `{}` as {}", name, ty);
        self.declared.push(name.clone());
        self.types.insert(name, ty);
    }

    fn ensure_fresh(&self, name: &str) -> LogicResult<()> {
        if self.types.contains_key(name) {
            Err(LogicError::DuplicateType(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Declare a new primitive, optionally below an existing primitive `parent`.
    pub fn declare_primitive(&mut self, name: &str, parent: Option<&str>) -> LogicResult<Type> {
        self.ensure_fresh(name)?;
        let parent = match parent {
            None => None,
            Some(parent_name) => match self.types.get(parent_name) {
                Some(Type::Primitive(primitive)) => Some(primitive.clone()),
                _ => return Err(LogicError::UnknownType(parent_name.to_string())),
            },
        };
        let ty = Self::make_primitive(name, parent);
        self.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    /// Declare `name` as an alias for the type written in `definition`.
    pub fn declare_complex(&mut self, name: &str, definition: &str) -> LogicResult<Type> {
        self.ensure_fresh(name)?;
        let ty = self.resolve(definition)?;
        self.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    /// Mark an already declared primitive as the type of bare numeric constants.
    pub fn set_numeral(&mut self, name: &str) -> LogicResult<()> {
        match self.types.get(name) {
            Some(ty @ Type::Primitive(_)) => {
                self.numeral = Some(ty.clone());
                Ok(())
            }
            _ => Err(LogicError::UnknownType(name.to_string())),
        }
    }

    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    /// Parse a type expression such as `<a,<e,t>>`, `t*` or a declared name.
    pub fn resolve(&self, text: &str) -> LogicResult<Type> {
        parser::parse_type(self, text)
    }

    /// Fully structural rendering of `ty`, with every alias expanded.
    pub fn unfold_type(&self, ty: &Type) -> String {
        ty.to_string()
    }

    /// The first declared name whose type is structurally equal to `ty`.
    pub fn name_of(&self, ty: &Type) -> Option<&str> {
        self.declared
            .iter()
            .find(|name| self.types.get(name.as_str()) == Some(ty))
            .map(String::as_str)
    }

    pub fn entity_type(&self) -> &Type {
        &self.entity
    }

    pub fn truth_type(&self) -> &Type {
        &self.truth
    }

    pub fn numeral_type(&self) -> Option<&Type> {
        self.numeral.as_ref()
    }

    /// Iterate over `(name, type)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.declared
            .iter()
            .filter_map(|name| self.types.get(name).map(|ty| (name.as_str(), ty)))
    }

    /// Build a repository from the contents of a TOML types file.
    ///
    /// `file` only labels error messages.
    pub fn from_toml_str(source: &str, file: &str) -> LogicResult<Self> {
        let decls: TypesFile =
            toml::from_str(source).map_err(|source| LogicError::TypesFileParse {
                file: file.to_string(),
                source,
            })?;

        let mut repo = Self {
            types: BTreeMap::new(),
            declared: Vec::new(),
            entity: Self::make_primitive(&decls.entity, None),
            truth: Self::make_primitive(&decls.truth, None),
            numeral: None,
        };
        for primitive in &decls.primitive {
            repo.declare_primitive(&primitive.name, primitive.parent.as_deref())?;
        }
        repo.entity = repo
            .get_type(&decls.entity)
            .cloned()
            .ok_or_else(|| LogicError::UnknownType(decls.entity.clone()))?;
        repo.truth = repo
            .get_type(&decls.truth)
            .cloned()
            .ok_or_else(|| LogicError::UnknownType(decls.truth.clone()))?;
        for complex in &decls.complex {
            repo.declare_complex(&complex.name, &complex.definition)?;
        }
        if let Some(numeral) = &decls.numeral {
            repo.set_numeral(numeral)?;
        }

        info!("Loaded {} types from `{}`", repo.declared.len(), file);
        Ok(repo)
    }

    /// Load a repository from a TOML types file on disk.
    pub fn load_from_toml(path: &Path) -> LogicResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| LogicError::Io {
            file: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source, &path.display().to_string())
    }
}
