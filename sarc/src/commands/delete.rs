use crate::cli::DeleteArgs;
use crate::commands::open_for_update;
use crate::error::{Error, Result};
use crate::util::finish;

pub fn run(args: DeleteArgs) -> Result<()> {
    let archive = open_for_update(&args.archive, sarc_format::Alignment::DEFAULT.get())?;

    let mut deleted = 0;
    for name in &args.names {
        let delete_err = |source| Error::DeleteEntry {
            name: name.clone(),
            source,
        };

        match archive.get_entry(name).map_err(delete_err)? {
            Some(entry) => {
                entry.delete().map_err(delete_err)?;
                deleted += 1;
            }
            None => println!("Skip: {} (File doesn't exist in the Archive.)", name),
        }
    }

    finish(archive, &args.archive)?;
    println!("Deleted {} file(s).", deleted);
    Ok(())
}
