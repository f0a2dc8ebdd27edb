use anyhow::Result;

use rios_cli::pipeline::{
    FromRiosOutcome, FromRiosRequest, ToRiosOutcome, ToRiosRequest, from_rios, to_rios,
};
use rios_convert::{FromRiosOptions, ToRiosOptions};

use crate::cli::{FromRiosArgs, ToRiosArgs};

pub fn run_to_rios(args: &ToRiosArgs) -> Result<ToRiosOutcome> {
    let mut options = ToRiosOptions::new(&args.id, &args.title)
        .with_localization(args.localization.clone())
        .with_instrument_version(args.instrument_version.clone())
        .with_suppress(args.suppress);
    if let Some(description) = &args.description {
        options = options.with_description(description);
    }
    to_rios(&ToRiosRequest {
        infile: args.infile.clone(),
        outfile_prefix: args.outfile_prefix.clone(),
        format: args.format.into(),
        options,
    })
}

pub fn run_from_rios(args: &FromRiosArgs) -> Result<FromRiosOutcome> {
    let options = FromRiosOptions::new()
        .with_localization(args.localization.clone())
        .with_suppress(args.suppress);
    from_rios(&FromRiosRequest {
        instrument: args.instrument.clone(),
        form: args.form.clone(),
        calculations: args.calculations.clone(),
        outfile: args.outfile.clone(),
        format: args.format.into(),
        options,
    })
}
