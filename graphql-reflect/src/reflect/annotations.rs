use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::Argument;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::DirectiveDefinition;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::Type;
use apollo_compiler::ast::Value;
use apollo_compiler::name;

/// Metadata attached to a class, member, parameter or enum constant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations {
    /// Overrides the GraphQL name.
    pub name: Option<String>,
    pub description: Option<String>,
    pub deprecated: Option<Deprecation>,
    /// Excludes the member from the schema.
    pub ignored: bool,
    /// Exposes the member as `ID`.
    pub id: bool,
    /// Marks a parameter receiving the request context.
    pub context: bool,
    pub directives: Vec<DirectiveAnnotation>,
}

impl Annotations {
    pub fn renamed(name: impl Into<String>) -> Self {
        Annotations {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn described(description: impl Into<String>) -> Self {
        Annotations {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn ignored() -> Self {
        Annotations {
            ignored: true,
            ..Default::default()
        }
    }

    pub fn id() -> Self {
        Annotations {
            id: true,
            ..Default::default()
        }
    }

    pub fn context() -> Self {
        Annotations {
            context: true,
            ..Default::default()
        }
    }

    pub fn deprecated(deprecation: Deprecation) -> Self {
        Annotations {
            deprecated: Some(deprecation),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_directive(mut self, directive: DirectiveAnnotation) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name.as_str() == name)
    }
}

/// Marks a member as deprecated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deprecation {
    pub reason: String,
    pub replace_with: Option<String>,
}

impl Deprecation {
    pub fn new(reason: impl Into<String>) -> Self {
        Deprecation {
            reason: reason.into(),
            replace_with: None,
        }
    }

    pub fn replace_with(mut self, replacement: impl Into<String>) -> Self {
        self.replace_with = Some(replacement.into());
        self
    }

    /// The reason exposed through `@deprecated`.
    pub fn message(&self) -> String {
        match self.replace_with.as_deref() {
            Some(replacement) if !replacement.is_empty() => {
                format!("{}, replace with {replacement}", self.reason)
            }
            _ => self.reason.clone(),
        }
    }

    pub(crate) fn to_directive(&self) -> Directive {
        Directive {
            name: name!("deprecated"),
            arguments: vec![Node::new(Argument {
                name: name!("reason"),
                value: Node::new(Value::String(self.message())),
            })],
        }
    }
}

/// A directive applied through an annotation, along with the definition it requires.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveAnnotation {
    pub name: Name,
    pub description: Option<String>,
    pub arguments: Vec<DirectiveArgument>,
    pub locations: Vec<DirectiveLocation>,
    pub repeatable: bool,
}

/// An argument value of a [`DirectiveAnnotation`], with the type declared in its definition.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveArgument {
    pub name: Name,
    pub ty: Type,
    pub value: Value,
}

impl DirectiveAnnotation {
    pub fn new(name: Name, locations: impl IntoIterator<Item = DirectiveLocation>) -> Self {
        DirectiveAnnotation {
            name,
            description: None,
            arguments: Vec::new(),
            locations: locations.into_iter().collect(),
            repeatable: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn argument(mut self, name: Name, ty: Type, value: Value) -> Self {
        self.arguments.push(DirectiveArgument { name, ty, value });
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// The applied directive.
    pub fn to_directive(&self) -> Directive {
        Directive {
            name: self.name.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|argument| {
                    Node::new(Argument {
                        name: argument.name.clone(),
                        value: Node::new(argument.value.clone()),
                    })
                })
                .collect(),
        }
    }

    /// The definition declaring this directive.
    pub fn definition(&self) -> DirectiveDefinition {
        DirectiveDefinition {
            description: self.description.as_deref().map(Into::into),
            name: self.name.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|argument| {
                    Node::new(InputValueDefinition {
                        description: None,
                        name: argument.name.clone(),
                        ty: Node::new(argument.ty.clone()),
                        default_value: None,
                        directives: Default::default(),
                    })
                })
                .collect(),
            repeatable: self.repeatable,
            locations: self.locations.clone(),
        }
    }
}
