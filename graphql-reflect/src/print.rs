//! Schema Definition Language printing.

use std::collections::HashMap;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::OperationType;
use apollo_compiler::collections::IndexSet;
use apollo_compiler::schema;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::DirectiveDefinition;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use derivative::Derivative;
use itertools::Itertools;

/// Directives every schema defines implicitly.
pub(crate) const BUILT_IN_DIRECTIVES: [&str; 5] =
    ["skip", "include", "deprecated", "specifiedBy", "oneOf"];

/// Scalars generated for built-in classes that are not part of the GraphQL specification.
pub(crate) const EXTENDED_SCALARS: [&str; 5] = ["Long", "Short", "BigDecimal", "BigInteger", "Char"];

/// What [`print_schema`] includes.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct PrintOptions {
    pub include_introspection_types: bool,
    pub include_scalar_types: bool,
    pub include_extended_scalar_types: bool,
    pub include_schema_definition: bool,
    pub include_directives: bool,
    /// Restricts printed directive definitions and applications by name.
    /// `@deprecated` is always printed.
    #[derivative(Debug = "ignore")]
    pub include_directive_filter: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
    /// Prints descriptions as `#` comments instead of strings.
    /// Argument descriptions are left out in this mode.
    pub descriptions_as_hash_comments: bool,
    /// Object and interface types carrying this directive print as `extend type` without it.
    pub type_extension_directive: Option<String>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            include_introspection_types: false,
            include_scalar_types: true,
            include_extended_scalar_types: true,
            include_schema_definition: true,
            include_directives: true,
            include_directive_filter: None,
            descriptions_as_hash_comments: false,
            type_extension_directive: None,
        }
    }
}

impl PrintOptions {
    pub fn with_directive_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.include_directive_filter = Some(Arc::new(filter));
        self
    }

    fn includes_directive(&self, name: &str) -> bool {
        name == "deprecated"
            || (self.include_directives
                && self
                    .include_directive_filter
                    .as_ref()
                    .is_none_or(|filter| filter(name)))
    }

    fn keeps(&self, directive: &Directive) -> bool {
        self.includes_directive(directive.name.as_str())
    }

    fn includes_type(&self, definition: &ExtendedType) -> bool {
        let name = definition.name().as_str();
        if name.starts_with("__") {
            return self.include_introspection_types;
        }
        if definition.is_built_in() {
            return false;
        }
        match definition {
            ExtendedType::Scalar(_) if EXTENDED_SCALARS.contains(&name) => {
                self.include_extended_scalar_types
            }
            ExtendedType::Scalar(_) => self.include_scalar_types,
            _ => true,
        }
    }
}

/// Prints `schema` in SDL. Directive definitions and types are sorted by name.
pub fn print_schema(schema: &Schema, options: &PrintOptions) -> String {
    let printer = Printer { options };
    let mut blocks = Vec::new();

    if options.include_schema_definition {
        blocks.push(schema_definition(schema).to_string());
    }

    if options.include_directives {
        blocks.extend(
            schema
                .directive_definitions
                .values()
                .filter(|definition| {
                    !BUILT_IN_DIRECTIVES.contains(&definition.name.as_str())
                        && options.includes_directive(definition.name.as_str())
                })
                .sorted_by(|a, b| a.name.as_str().cmp(b.name.as_str()))
                .map(|definition| printer.directive_definition(definition)),
        );
    }

    blocks.extend(
        schema
            .types
            .values()
            .filter(|definition| options.includes_type(definition))
            .sorted_by(|a, b| a.name().as_str().cmp(b.name().as_str()))
            .map(|definition| printer.extended_type(definition)),
    );

    if blocks.is_empty() {
        return String::new();
    }
    let mut sdl = blocks.join("\n\n");
    sdl.push('\n');
    sdl
}

/// The `schema` definition, printed even when its root types use the default names.
fn schema_definition(schema: &Schema) -> ast::SchemaDefinition {
    let roots = &schema.schema_definition;
    ast::SchemaDefinition {
        description: None,
        directives: ast::DirectiveList::default(),
        root_operations: [
            (OperationType::Query, &roots.query),
            (OperationType::Mutation, &roots.mutation),
            (OperationType::Subscription, &roots.subscription),
        ]
        .into_iter()
        .filter_map(|(operation, root)| {
            root.as_ref()
                .map(|root| Node::new((operation, root.name.clone())))
        })
        .collect(),
    }
}

/// Descriptions lifted out of a definition when they print as `#` comments.
#[derive(Default)]
struct HashComments {
    definition: Option<Node<str>>,
    members: HashMap<String, Node<str>>,
}

impl HashComments {
    /// Puts the comments above the printed definition and above its members' lines.
    fn apply(&self, printed: &str) -> String {
        let mut out = String::new();
        if let Some(description) = &self.definition {
            push_comment(&mut out, "", description);
        }
        for line in printed.lines() {
            let member = line
                .strip_prefix("  ")
                .filter(|member| !member.starts_with(' '))
                .map(|member| &member[..member.find(['(', ':', ' ']).unwrap_or(member.len())]);
            if let Some(description) = member.and_then(|member| self.members.get(member)) {
                push_comment(&mut out, "  ", description);
            }
            out.push_str(line);
            out.push('\n');
        }
        out.truncate(out.trim_end().len());
        out
    }
}

fn push_comment(out: &mut String, indent: &str, description: &str) {
    for line in description.lines() {
        out.push_str(indent);
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
}

/// Strips what the options leave out from cloned definitions before apollo-compiler prints them.
struct Printer<'a> {
    options: &'a PrintOptions,
}

impl Printer<'_> {
    fn lift_description(&self, description: &mut Option<Node<str>>) -> Option<Node<str>> {
        if self.options.descriptions_as_hash_comments {
            description.take()
        } else {
            None
        }
    }

    fn input_value(&self, value: &mut InputValueDefinition) -> Option<Node<str>> {
        value.directives.retain(|directive| self.options.keeps(directive));
        self.lift_description(&mut value.description)
    }

    fn arguments(&self, arguments: &mut [Node<InputValueDefinition>]) {
        for argument in arguments {
            self.input_value(argument.make_mut());
        }
    }

    fn field(&self, field: &mut FieldDefinition, comments: &mut HashComments) {
        field.directives.retain(|directive| self.options.keeps(directive));
        self.arguments(&mut field.arguments);
        if let Some(description) = self.lift_description(&mut field.description) {
            comments.members.insert(field.name.to_string(), description);
        }
    }

    fn directive_definition(&self, definition: &Node<DirectiveDefinition>) -> String {
        let mut definition = definition.clone();
        let definition = definition.make_mut();
        let comments = HashComments {
            definition: self.lift_description(&mut definition.description),
            ..Default::default()
        };
        self.arguments(&mut definition.arguments);
        comments.apply(&definition.to_string())
    }

    fn extended_type(&self, definition: &ExtendedType) -> String {
        let mut definition = definition.clone();
        let mut comments = HashComments::default();
        match &mut definition {
            ExtendedType::Scalar(scalar) => {
                let scalar = scalar.make_mut();
                scalar.directives.retain(|directive| self.options.keeps(directive));
                comments.definition = self.lift_description(&mut scalar.description);
            }
            ExtendedType::Object(object) => {
                let object = object.make_mut();
                let extends = self.strip_extension_marker(&mut object.directives);
                object.directives.retain(|directive| self.options.keeps(directive));
                for field in object.fields.values_mut() {
                    self.field(field.make_mut(), &mut comments);
                }
                comments.definition = self.lift_description(&mut object.description);
                if extends {
                    let extension = ast::ObjectTypeExtension {
                        name: object.name.clone(),
                        implements_interfaces: names(&object.implements_interfaces),
                        directives: ast_directives(&object.directives),
                        fields: object.fields.values().map(|field| field.node.clone()).collect(),
                    };
                    return comments.apply(&extension.to_string());
                }
            }
            ExtendedType::Interface(interface) => {
                let interface = interface.make_mut();
                let extends = self.strip_extension_marker(&mut interface.directives);
                interface.directives.retain(|directive| self.options.keeps(directive));
                for field in interface.fields.values_mut() {
                    self.field(field.make_mut(), &mut comments);
                }
                comments.definition = self.lift_description(&mut interface.description);
                if extends {
                    let extension = ast::InterfaceTypeExtension {
                        name: interface.name.clone(),
                        implements_interfaces: names(&interface.implements_interfaces),
                        directives: ast_directives(&interface.directives),
                        fields: interface.fields.values().map(|field| field.node.clone()).collect(),
                    };
                    return comments.apply(&extension.to_string());
                }
            }
            ExtendedType::Union(union_) => {
                let union_ = union_.make_mut();
                union_.directives.retain(|directive| self.options.keeps(directive));
                comments.definition = self.lift_description(&mut union_.description);
            }
            ExtendedType::Enum(enum_) => {
                let enum_ = enum_.make_mut();
                enum_.directives.retain(|directive| self.options.keeps(directive));
                for value in enum_.values.values_mut() {
                    let value = value.make_mut();
                    value.directives.retain(|directive| self.options.keeps(directive));
                    if let Some(description) = self.lift_description(&mut value.description) {
                        comments.members.insert(value.value.to_string(), description);
                    }
                }
                comments.definition = self.lift_description(&mut enum_.description);
            }
            ExtendedType::InputObject(input) => {
                let input = input.make_mut();
                input.directives.retain(|directive| self.options.keeps(directive));
                for field in input.fields.values_mut() {
                    let field = field.make_mut();
                    if let Some(description) = self.input_value(field) {
                        comments.members.insert(field.name.to_string(), description);
                    }
                }
                comments.definition = self.lift_description(&mut input.description);
            }
        }
        comments.apply(&definition.to_string())
    }

    /// Removes the type extension directive, returning whether the type carried it.
    fn strip_extension_marker(&self, directives: &mut schema::DirectiveList) -> bool {
        let Some(marker) = self.options.type_extension_directive.as_deref() else {
            return false;
        };
        let extends = directives.has(marker);
        directives.retain(|directive| directive.name.as_str() != marker);
        extends
    }
}

fn names(interfaces: &IndexSet<ComponentName>) -> Vec<Name> {
    interfaces.iter().map(|interface| interface.name.clone()).collect()
}

fn ast_directives(directives: &schema::DirectiveList) -> ast::DirectiveList {
    ast::DirectiveList(directives.iter().map(|directive| directive.node.clone()).collect())
}
