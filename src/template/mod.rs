//! The `{{template}}` model: arguments, hierarchy resolution, rendering.
//!
//! [`Template`] is the freestanding model, built by callers; a
//! [`ParsedTemplate`] additionally records where in a document it was
//! parsed from and can splice a rendering back into that document.

pub mod argument;
pub mod model;
pub mod parsed;

pub use argument::{NewArg, TemplateArgument};
pub use model::{
    GetArgOptions, LinebreakPredicate, NameProp, RenderOptions, Template, TemplateConfig,
    Unformatted,
};
pub use parsed::{ParsedTemplate, ReplaceOptions};
