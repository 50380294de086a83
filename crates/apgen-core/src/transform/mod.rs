//! Post-parse IR rewrites. Both transforms are idempotent, add components
//! without removing referenced ones, and never touch the source spec.

mod enums;
mod read_write;

use crate::config::EnumMode;
use crate::context::Context;
use crate::error::Error;

pub use enums::lift_enums;
pub use read_write::split_read_write;

/// Apply the configured transforms to the IR.
pub fn apply(ctx: &mut Context) -> Result<(), Error> {
    let Context { config, ir, .. } = ctx;
    let transforms = &config.parser.transforms;

    if transforms.enums.enabled && transforms.enums.mode == EnumMode::Lift {
        lift_enums(ir);
    }
    if transforms.read_write.enabled {
        split_read_write(ir);
    }
    Ok(())
}
