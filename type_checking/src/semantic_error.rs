use ast::{Line, Located};
use failure::Fail;

/// Everything semantic analysis can reject. Analysis stops at the first
/// error, which is reported together with the line of the offending node.
#[derive(Debug, Fail, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[fail(display = "Class {} not found.", class)]
    ClassNotFound { class: String },

    #[fail(display = "A class with the same name already exists : {}", class)]
    DuplicateClass { class: String },

    #[fail(
        display = "A method with the same name already exists in class {} : {}",
        class, method
    )]
    DuplicateMethod { class: String, method: String },

    #[fail(
        display = "An attribute with the same name already exists in class {} : {}",
        class, attribute
    )]
    DuplicateAttribute { class: String, attribute: String },

    #[fail(display = "Attribute {} is redefined.", attribute)]
    AttributeRedefined { attribute: String },

    #[fail(display = "Attribute {} not found in class {}", attribute, class)]
    AttributeNotFound { attribute: String, class: String },

    #[fail(display = "Method {} not found in class {}", method, class)]
    MethodNotFound { method: String, class: String },

    #[fail(display = "Not enough arguments in method call {}", method)]
    NotEnoughArguments { method: String },

    #[fail(display = "Too many arguments in method call {}", method)]
    TooManyArguments { method: String },

    #[fail(display = "Cannot convert a value of type {} into {}", from, to)]
    CannotConvert { from: String, to: String },

    #[fail(display = "Cannot convert from {} to {} in StaticDispatch", from, to)]
    CannotConvertInStaticDispatch { from: String, to: String },

    #[fail(display = "Invalid type of parameters for {} expression", operator)]
    InvalidTypeOfParameters { operator: &'static str },

    #[fail(display = "Cannot convert '+' expression to Int or String")]
    CannotConvertAddition,

    #[fail(display = "Illegal construction : new {}", class)]
    IllegalConstruction { class: String },

    #[fail(display = "Class {} recursively inherits itself.", class)]
    InheritanceCycle { class: String },

    #[fail(display = "A class cannot inherit a String")]
    CannotInheritString,

    #[fail(display = "Overloaded method has a different number of parameters")]
    OverrideArityMismatch,

    #[fail(display = "Parameter {} has a different type in overloaded method.", param)]
    OverrideParamTypeMismatch { param: String },

    #[fail(display = "Return type changed in overloaded method.")]
    OverrideReturnTypeMismatch,

    #[fail(display = "{} condition must be Int", construct)]
    ConditionMustBeInt { construct: &'static str },
}

impl SemanticError {
    pub fn at(self, line: Line) -> Located<SemanticError> {
        Located::new(line, self)
    }
}

pub type SemanticResult<T> = Result<T, Located<SemanticError>>;
