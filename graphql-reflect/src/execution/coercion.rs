//! Conversion of GraphQL argument values into the shape declared by host parameters.

use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;
use uuid::Uuid;

use crate::error::FetchError;
use crate::reflect::BuiltinClass;
use crate::reflect::ClassKind;
use crate::reflect::ClassRef;
use crate::reflect::ClassRegistry;
use crate::reflect::TypeDescriptor;
use crate::reflect::Visibility;

/// Converts `value`, received for the argument `argument`, to the type `ty`.
///
/// Enum values become host constant names and input object fields are renamed to their host
/// property names. Classes missing from `registry` are mapped by hooks and passed through as is.
/// Integers exposed as `ID` (`id`) are also accepted as numeric strings.
pub(crate) fn coerce_argument(
    registry: &ClassRegistry,
    argument: &str,
    value: Value,
    ty: &TypeDescriptor,
    id: bool,
) -> Result<Value, FetchError> {
    Coercion { registry }.coerce(argument, value, ty, id)
}

struct Coercion<'a> {
    registry: &'a ClassRegistry,
}

impl Coercion<'_> {
    fn coerce(
        &self,
        path: &str,
        value: Value,
        ty: &TypeDescriptor,
        id: bool,
    ) -> Result<Value, FetchError> {
        if value.is_null() {
            return if ty.nullable {
                Ok(Value::Null)
            } else {
                Err(invalid(path, "null given for a non-null value"))
            };
        }
        match &ty.class {
            ClassRef::Builtin(builtin) => self.coerce_builtin(path, value, ty, *builtin, id),
            ClassRef::Named(name) => match self.registry.get(name) {
                None => Ok(value),
                Some(class) => match &class.kind {
                    ClassKind::Enum(constants) => {
                        let given = value
                            .as_str()
                            .ok_or_else(|| invalid(path, "expected an enum value"))?;
                        constants
                            .iter()
                            .find(|constant| {
                                constant.annotations.name.as_deref().unwrap_or(&constant.name)
                                    == given
                            })
                            .map(|constant| Value::String(constant.name.clone().into()))
                            .ok_or_else(|| {
                                invalid(path, &format!("{given} is not a value of {}", class.simple_name))
                            })
                    }
                    ClassKind::Object => {
                        let Value::Object(fields) = value else {
                            return Err(invalid(path, "expected an input object"));
                        };
                        let mut converted = Map::new();
                        for (field, field_value) in fields {
                            let property = class
                                .properties
                                .iter()
                                .filter(|property| {
                                    property.visibility == Visibility::Public
                                        && !property.annotations.ignored
                                })
                                .find(|property| {
                                    property.annotations.name.as_deref().unwrap_or(&property.name)
                                        == field.as_str()
                                })
                                .ok_or_else(|| {
                                    invalid(path, &format!("unknown input field {}", field.as_str()))
                                })?;
                            let field_path = format!("{path}.{}", field.as_str());
                            converted.insert(
                                ByteString::from(property.name.clone()),
                                self.coerce(
                                    &field_path,
                                    field_value,
                                    &property.ty,
                                    property.annotations.id,
                                )?,
                            );
                        }
                        Ok(Value::Object(converted))
                    }
                    ClassKind::Interface => Err(invalid(
                        path,
                        &format!("{} cannot be used as an input type", class.simple_name),
                    )),
                },
            },
        }
    }

    fn coerce_builtin(
        &self,
        path: &str,
        value: Value,
        ty: &TypeDescriptor,
        builtin: BuiltinClass,
        id: bool,
    ) -> Result<Value, FetchError> {
        match builtin {
            BuiltinClass::Int => integer(path, &value, id, i32::MIN.into(), i32::MAX.into()),
            BuiltinClass::Short => integer(path, &value, id, i16::MIN.into(), i16::MAX.into()),
            BuiltinClass::Long => integer(path, &value, id, i64::MIN, i64::MAX),
            BuiltinClass::BigInteger => {
                let is_integer = match &value {
                    Value::Number(number) => number.is_i64() || number.is_u64(),
                    Value::String(digits) => {
                        let digits = digits.as_str().trim_start_matches('-');
                        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
                    }
                    _ => false,
                };
                if is_integer {
                    Ok(value)
                } else {
                    Err(invalid(path, "expected an integer"))
                }
            }
            BuiltinClass::Float | BuiltinClass::Double => value
                .as_f64()
                .map(Value::from)
                .ok_or_else(|| invalid(path, "expected a number")),
            BuiltinClass::BigDecimal => {
                let is_decimal = match &value {
                    Value::Number(_) => true,
                    Value::String(decimal) => decimal.as_str().parse::<f64>().is_ok(),
                    _ => false,
                };
                if is_decimal {
                    Ok(value)
                } else {
                    Err(invalid(path, "expected a decimal number"))
                }
            }
            BuiltinClass::String => match value {
                Value::String(_) => Ok(value),
                _ => Err(invalid(path, "expected a string")),
            },
            BuiltinClass::Char => {
                if value.as_str().is_some_and(|s| s.chars().count() == 1) {
                    Ok(value)
                } else {
                    Err(invalid(path, "expected a single character"))
                }
            }
            BuiltinClass::Boolean => match value {
                Value::Bool(_) => Ok(value),
                _ => Err(invalid(path, "expected a boolean")),
            },
            BuiltinClass::Uuid => value
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(|uuid| Value::String(uuid.hyphenated().to_string().into()))
                .ok_or_else(|| invalid(path, "expected a UUID")),
            BuiltinClass::List | BuiltinClass::Array => {
                let element = ty
                    .arguments
                    .first()
                    .ok_or_else(|| invalid(path, "list type has no element type"))?;
                let items = match value {
                    Value::Array(items) => items,
                    single => vec![single],
                };
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        self.coerce(&format!("{path}[{index}]"), item, element, id)
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            BuiltinClass::Future
            | BuiltinClass::Publisher
            | BuiltinClass::FetchResult
            | BuiltinClass::Context
            | BuiltinClass::Environment => {
                Err(invalid(path, &format!("{builtin} cannot be an argument")))
            }
        }
    }
}

/// IDs are received as strings, so numeric strings are accepted for them.
fn integer(path: &str, value: &Value, id: bool, min: i64, max: i64) -> Result<Value, FetchError> {
    let integer = value.as_i64().or_else(|| {
        value
            .as_str()
            .filter(|_| id)
            .and_then(|digits| digits.parse().ok())
    });
    match integer {
        Some(integer) if (min..=max).contains(&integer) => Ok(Value::from(integer)),
        Some(_) => Err(invalid(path, "integer out of range")),
        None => Err(invalid(path, "expected an integer")),
    }
}

fn invalid(path: &str, reason: &str) -> FetchError {
    FetchError::InvalidArgument {
        argument: path.to_string(),
        reason: reason.to_string(),
    }
}
