//! Explicit descriptions of host classes.
//!
//! The generator never inspects code at runtime. Instead every class that takes part in a schema
//! is described by a [`ClassDescriptor`] and registered in a [`ClassRegistry`]; member types are
//! referenced through [`TypeDescriptor`]s.

mod annotations;
pub(crate) mod filters;
mod registry;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use derivative::Derivative;
use futures::FutureExt;
use serde_json_bytes::Value;
use strum_macros::Display;

pub use self::annotations::Annotations;
pub use self::annotations::Deprecation;
pub use self::annotations::DirectiveAnnotation;
pub use self::annotations::DirectiveArgument;
pub use self::registry::ClassRegistry;
use crate::error::FetchError;
use crate::error::SchemaGenerationError;
use crate::execution::FetchOutput;
use crate::execution::Invocation;
use crate::execution::Invoker;
use crate::execution::PropertyAccessor;

/// Classes the generator knows without registration.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinClass {
    Int,
    Long,
    Short,
    Float,
    Double,
    BigDecimal,
    BigInteger,
    Char,
    String,
    Boolean,
    #[strum(serialize = "UUID")]
    Uuid,
    List,
    Array,
    /// An asynchronous computation of its single type argument.
    Future,
    /// A stream of its single type argument, used by subscriptions.
    Publisher,
    /// A value of its single type argument accompanied by errors.
    FetchResult,
    /// The request [`Context`](crate::Context).
    Context,
    /// The raw [`DataFetchingEnvironment`](crate::execution::DataFetchingEnvironment).
    Environment,
}

impl BuiltinClass {
    pub(crate) fn is_wrapper(self) -> bool {
        matches!(
            self,
            BuiltinClass::Future | BuiltinClass::Publisher | BuiltinClass::FetchResult
        )
    }
}

/// Identity of a host class.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassRef {
    Builtin(BuiltinClass),
    /// A registered class, by qualified name.
    Named(Arc<str>),
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRef::Builtin(builtin) => write!(f, "{builtin}"),
            ClassRef::Named(name) => f.write_str(name),
        }
    }
}

/// A reference to a host type: class, generic arguments and nullability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub class: ClassRef,
    pub arguments: Vec<TypeDescriptor>,
    pub nullable: bool,
}

impl TypeDescriptor {
    /// A non-null reference to the registered class `qualified_name`.
    pub fn of(qualified_name: impl Into<Arc<str>>) -> Self {
        TypeDescriptor {
            class: ClassRef::Named(qualified_name.into()),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn builtin(class: BuiltinClass) -> Self {
        TypeDescriptor {
            class: ClassRef::Builtin(class),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    pub fn int() -> Self {
        Self::builtin(BuiltinClass::Int)
    }

    pub fn long() -> Self {
        Self::builtin(BuiltinClass::Long)
    }

    pub fn float() -> Self {
        Self::builtin(BuiltinClass::Float)
    }

    pub fn double() -> Self {
        Self::builtin(BuiltinClass::Double)
    }

    pub fn string() -> Self {
        Self::builtin(BuiltinClass::String)
    }

    pub fn boolean() -> Self {
        Self::builtin(BuiltinClass::Boolean)
    }

    pub fn uuid() -> Self {
        Self::builtin(BuiltinClass::Uuid)
    }

    pub fn context() -> Self {
        Self::builtin(BuiltinClass::Context)
    }

    pub fn environment() -> Self {
        Self::builtin(BuiltinClass::Environment)
    }

    pub fn list_of(element: TypeDescriptor) -> Self {
        Self::builtin(BuiltinClass::List).with_argument(element)
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::builtin(BuiltinClass::Array).with_argument(element)
    }

    pub fn future_of(value: TypeDescriptor) -> Self {
        Self::builtin(BuiltinClass::Future).with_argument(value)
    }

    pub fn publisher_of(value: TypeDescriptor) -> Self {
        Self::builtin(BuiltinClass::Publisher).with_argument(value)
    }

    pub fn fetch_result_of(value: TypeDescriptor) -> Self {
        Self::builtin(BuiltinClass::FetchResult).with_argument(value)
    }

    /// Adds a generic type argument.
    pub fn with_argument(mut self, argument: TypeDescriptor) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Marks the type as optional.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_builtin(&self, class: BuiltinClass) -> bool {
        self.class == ClassRef::Builtin(class)
    }

    /// The single type argument of a wrapper or collection.
    pub(crate) fn type_argument(&self) -> Result<&TypeDescriptor, SchemaGenerationError> {
        self.arguments
            .first()
            .ok_or_else(|| SchemaGenerationError::TypeNotSupported {
                type_name: self.class.to_string(),
                reason: "missing generic type argument".to_string(),
            })
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (index, argument) in self.arguments.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

/// A constant of an enum class.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumConstant {
    pub name: String,
    pub annotations: Annotations,
}

impl EnumConstant {
    pub fn new(name: impl Into<String>) -> Self {
        EnumConstant {
            name: name.into(),
            annotations: Annotations::default(),
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassKind {
    Object,
    Interface,
    /// An enum with its constants in declaration order.
    Enum(Vec<EnumConstant>),
}

/// A host class.
#[derive(Clone, Debug)]
pub struct ClassDescriptor {
    pub qualified_name: Arc<str>,
    pub simple_name: String,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub annotations: Annotations,
    /// Qualified names of the implemented interfaces.
    pub supertypes: Vec<Arc<str>>,
    pub properties: Vec<PropertyDescriptor>,
    pub functions: Vec<FunctionDescriptor>,
}

impl ClassDescriptor {
    fn new(qualified_name: &str, kind: ClassKind) -> Self {
        let simple_name = qualified_name
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(qualified_name)
            .to_string();
        ClassDescriptor {
            qualified_name: qualified_name.into(),
            simple_name,
            kind,
            visibility: Visibility::Public,
            annotations: Annotations::default(),
            supertypes: Vec::new(),
            properties: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// A concrete class. The simple name is the last segment of `qualified_name`.
    pub fn object(qualified_name: &str) -> Self {
        Self::new(qualified_name, ClassKind::Object)
    }

    /// An interface. Without members it is a union marker.
    pub fn interface(qualified_name: &str) -> Self {
        Self::new(qualified_name, ClassKind::Interface)
    }

    pub fn enumeration(
        qualified_name: &str,
        constants: impl IntoIterator<Item = EnumConstant>,
    ) -> Self {
        Self::new(
            qualified_name,
            ClassKind::Enum(constants.into_iter().collect()),
        )
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.supertypes.push(interface.into());
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn function(mut self, function: FunctionDescriptor) -> Self {
        self.functions.push(function);
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// An interface declaring no member is a union marker.
    pub fn is_union(&self) -> bool {
        self.is_interface() && self.properties.is_empty() && self.functions.is_empty()
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, ClassKind::Enum(_))
    }

    pub fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::of(self.qualified_name.clone())
    }
}

/// A property of a host class.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub visibility: Visibility,
    pub annotations: Annotations,
    /// Reads the property from a source object. Defaults to the object member named `name`.
    #[derivative(Debug = "ignore")]
    pub accessor: Option<PropertyAccessor>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        PropertyDescriptor {
            name: name.into(),
            ty,
            visibility: Visibility::Public,
            annotations: Annotations::default(),
            accessor: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_accessor<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, FetchError> + Send + Sync + 'static,
    {
        self.accessor = Some(Arc::new(accessor));
        self
    }
}

/// A parameter of a host function.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub annotations: Annotations,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        ParameterDescriptor {
            name: name.into(),
            ty,
            annotations: Annotations::default(),
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Whether the parameter receives the request [`Context`](crate::Context).
    pub fn is_context(&self) -> bool {
        self.annotations.context || self.ty.is_builtin(BuiltinClass::Context)
    }

    pub fn is_environment(&self) -> bool {
        self.ty.is_builtin(BuiltinClass::Environment)
    }
}

/// A member or extension function of a host class.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct FunctionDescriptor {
    pub name: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: TypeDescriptor,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub annotations: Annotations,
    #[derivative(Debug = "ignore")]
    pub invoker: Option<Invoker>,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        FunctionDescriptor {
            name: name.into(),
            parameters: Vec::new(),
            return_type,
            visibility: Visibility::Public,
            is_abstract: false,
            annotations: Annotations::default(),
            invoker: None,
        }
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Declares the function without a body. Abstract functions get no data fetcher.
    pub fn abstract_function(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Binds the code executed when the field is resolved.
    pub fn with_invoker<F, Fut>(mut self, invoker: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FetchOutput, FetchError>> + Send + 'static,
    {
        self.invoker = Some(Arc::new(move |invocation| invoker(invocation).boxed()));
        self
    }
}
