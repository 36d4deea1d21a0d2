//! Helpers available to every registered and inline template.

use handlebars::{handlebars_helper, Handlebars};

handlebars_helper!(equals: |left: Json, right: Json| left == right);

pub fn register(registry: &mut Handlebars<'static>) {
    registry.register_helper("equals", Box::new(equals));
}
