use common::{source::SourceRange, string_map::StringIndex};
use errors::ErrorType;

#[derive(Clone, Debug)]
pub enum Error {
    NameAlreadyDefined {
        source: SourceRange,
        name: StringIndex,
    },

    UndefinedName {
        source: SourceRange,
        name: StringIndex,
    },

    UndefinedType {
        source: SourceRange,
        name: StringIndex,
    },

    NotCallable {
        source: SourceRange,
        name: StringIndex,
    },

    ArityMismatch {
        source: SourceRange,
        expected: usize,
        got: usize,
    },

    TypeMismatch {
        source: SourceRange,
        expected: String,
        found: String,
    },

    NotAStruct {
        source: SourceRange,
        found: String,
    },

    MissingFields {
        source: SourceRange,
        names: Vec<String>,
    },

    UnknownField {
        source: SourceRange,
        name: StringIndex,
        within: String,
    },

    DuplicateField {
        declared_at: SourceRange,
        error_point: SourceRange,
    },

    DuplicateArg {
        declared_at: SourceRange,
        error_point: SourceRange,
    },

    NonNumeric {
        source: SourceRange,
        found: String,
    },

    NotEqualityComparable {
        source: SourceRange,
        found: String,
    },

    ExpectedEnum {
        source: SourceRange,
        found: String,
    },

    UnknownVariant {
        source: SourceRange,
        name: StringIndex,
        within: String,
    },

    VariantRequiresValue {
        source: SourceRange,
        variant: StringIndex,
    },

    VariantIsUnit {
        source: SourceRange,
        variant: StringIndex,
    },

    UnitVariantReceivedArg {
        source: SourceRange,
        variant: StringIndex,
    },

    EnumVariantExcessArgs {
        source: SourceRange,
        variant: StringIndex,
        got: usize,
    },
}


impl ErrorType for Error {
    fn display(&self, fmt: &mut errors::fmt::ErrorFormatter) {
        match self {
            Error::NameAlreadyDefined { source, name } => {
                let name = fmt.string(*name).to_string();
                fmt.error(&format!("The name \"{name}\" is already defined"))
                    .highlight_with_note(
                        *source,
                        "there is already a symbol with this name",
                    )
            },


            Error::UndefinedName { source, name } => {
                let name = fmt.string(*name).to_string();
                fmt.error(&format!("Undefined name \"{name}\""))
                    .highlight_with_note(
                        *source,
                        "not found in this scope",
                    )
            },


            Error::UndefinedType { source, name } => {
                let name = fmt.string(*name).to_string();
                fmt.error(&format!("Undefined type \"{name}\""))
                    .highlight_with_note(
                        *source,
                        "there is no type with this name in scope",
                    )
            },


            Error::NotCallable { source, name } => {
                let name = fmt.string(*name).to_string();
                fmt.error(&format!("\"{name}\" is not callable"))
                    .highlight_with_note(
                        *source,
                        "only functions can be called",
                    )
            },


            Error::ArityMismatch { source, expected, got } => {
                fmt.error(&format!("Expected {expected} argument(s), but got {got}"))
                    .highlight_with_note(
                        *source,
                        &format!("this call supplies {got} argument(s)"),
                    )
            },


            Error::TypeMismatch { source, expected, found } => {
                fmt.error(&format!("Expected a value of type \"{expected}\", but found \"{found}\""))
                    .highlight_with_note(
                        *source,
                        &format!("this is of type \"{found}\""),
                    )
            },


            Error::NotAStruct { source, found } => {
                fmt.error(&format!("\"{found}\" is not a struct"))
                    .highlight_with_note(
                        *source,
                        "field access requires a struct value",
                    )
            },


            Error::MissingFields { source, names } => {
                let names = names.join("\", \"");
                fmt.error(&format!("Missing field(s) \"{names}\""))
                    .highlight_with_note(
                        *source,
                        "every declared field must be provided",
                    )
            },


            Error::UnknownField { source, name, within } => {
                let name = fmt.string(*name).to_string();
                fmt.error(&format!("Unknown field \"{name}\" on \"{within}\""))
                    .highlight_with_note(
                        *source,
                        &format!("\"{within}\" does not declare this field"),
                    )
            },


            Error::DuplicateField { declared_at, error_point } => {
                let mut error = fmt.error("Duplicate field");
                error.highlight_with_note(*declared_at, "the field is declared here");
                error.highlight_with_note(*error_point, "..but it's redeclared here");
            },


            Error::DuplicateArg { declared_at, error_point } => {
                let mut error = fmt.error("Duplicate argument");
                error.highlight_with_note(*declared_at, "the argument is declared here");
                error.highlight_with_note(*error_point, "..but it's redeclared here");
            },


            Error::NonNumeric { source, found } => {
                fmt.error(&format!("Expected a numeric value, but found \"{found}\""))
                    .highlight_with_note(
                        *source,
                        "arithmetic requires 'i32' or 'f64' operands",
                    )
            },


            Error::NotEqualityComparable { source, found } => {
                fmt.error(&format!("Values of type \"{found}\" cannot be compared"))
                    .highlight(*source)
            },


            Error::ExpectedEnum { source, found } => {
                fmt.error(&format!("\"{found}\" is not an enum"))
                    .highlight_with_note(
                        *source,
                        "variant paths require an enum",
                    )
            },


            Error::UnknownVariant { source, name, within } => {
                let name = fmt.string(*name).to_string();
                fmt.error(&format!("Unknown variant \"{name}\" on \"{within}\""))
                    .highlight_with_note(
                        *source,
                        &format!("\"{within}\" does not declare this variant"),
                    )
            },


            Error::VariantRequiresValue { source, variant } => {
                let variant = fmt.string(*variant).to_string();
                fmt.error(&format!("Variant \"{variant}\" requires a value"))
                    .highlight_with_note(
                        *source,
                        "construct it with a single value argument",
                    )
            },


            Error::VariantIsUnit { source, variant } => {
                let variant = fmt.string(*variant).to_string();
                fmt.error(&format!("Variant \"{variant}\" is a unit variant"))
                    .highlight_with_note(
                        *source,
                        "unit variants take no argument list",
                    )
            },


            Error::UnitVariantReceivedArg { source, variant } => {
                let variant = fmt.string(*variant).to_string();
                fmt.error(&format!("Variant \"{variant}\" is a unit variant and takes no arguments"))
                    .highlight_with_note(
                        *source,
                        "remove these arguments",
                    )
            },


            Error::EnumVariantExcessArgs { source, variant, got } => {
                let variant = fmt.string(*variant).to_string();
                fmt.error(&format!(
                    "Variant \"{variant}\" is not a unit variant. \
                     Expected a single value argument, but got {got}."))
                    .highlight_with_note(
                        *source,
                        "expected exactly one argument",
                    )
            },
        }
    }
}
