use crate::cli::UpdateArgs;
use crate::commands::open_for_update;
use crate::error::{Error, Result};
use crate::util::{collect_inputs, copy_into, create_progress_bar, finish};

pub fn run(args: UpdateArgs) -> Result<()> {
    let inputs = collect_inputs(&args.files)?;
    let archive = open_for_update(&args.archive, args.alignment)?;

    let pb = create_progress_bar(inputs.len() as u64, "Updating", args.quiet);
    let mut replaced = 0;
    for input in &inputs {
        let add_err = |source| Error::AddFile {
            path: input.path.clone(),
            source,
        };

        let entry = match archive.get_entry(&input.name).map_err(add_err)? {
            Some(entry) => {
                replaced += 1;
                entry
            }
            None => archive.create_entry(&input.name).map_err(add_err)?,
        };
        copy_into(&entry, input)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    finish(archive, &args.archive)?;

    if !args.quiet {
        println!(
            "Updated {} file(s), added {} file(s).",
            replaced,
            inputs.len() - replaced
        );
    }
    Ok(())
}
