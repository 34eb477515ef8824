use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;

use crate::array::Array;
use crate::config::{RunConfig, RunStatus};
use crate::database::{BlockIndex, Database, Field};
use crate::error::Error;




/*
 * A checkpoint is a directory: the run's config.json and status.json, plus
 * one subdirectory per patch (named after its block index) holding one
 * serialized array per field. Arrays go down in CBOR, a self-describing
 * binary header followed by the row-major doubles.
 */




// ============================================================================
fn patch_dirname(block: BlockIndex) -> String {
    format!("{:04}-{:04}-{:04}", block.0, block.1, block.2)
}

fn parse_patch_dirname(name: &str) -> Option<BlockIndex> {
    let mut parts = name.splitn(3, '-').map(str::parse::<i64>);

    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(b)), Some(Ok(i)), Some(Ok(j))) => Some((b, i, j)),
        _ => None,
    }
}




// ============================================================================
/// Write a complete restart point under `<outdir>/chkpt.NNNN`. A stale
/// directory of the same name is removed first so deleted patches cannot
/// survive into the new checkpoint.
///
pub fn write_chkpt(
    database: &Database,
    cfg: &RunConfig,
    sts: &RunStatus,
    count: i64,
) -> Result<(), Error> {
    let directory = cfg.make_filename_chkpt(count);
    info!("write checkpoint {}", directory.display());

    if directory.exists() {
        fs::remove_dir_all(&directory)?;
    }
    fs::create_dir_all(&directory)?;

    serde_json::to_writer_pretty(File::create(directory.join("config.json"))?, cfg)?;
    serde_json::to_writer_pretty(File::create(directory.join("status.json"))?, sts)?;

    for ((block, field), array) in database.iter() {
        let patch_dir = directory.join(patch_dirname(*block));
        fs::create_dir_all(&patch_dir)?;

        let file = File::create(patch_dir.join(field.name()))?;
        ciborium::ser::into_writer(array, BufWriter::new(file))
            .map_err(|e| Error::Checkpoint(e.to_string()))?;
    }
    Ok(())
}


/// Walk a checkpoint directory and insert every patch array it holds into
/// an already-shaped database. The config and status files are read
/// separately; unrecognized entries are an error.
///
pub fn load_patches_from_chkpt(database: &mut Database, directory: &Path) -> Result<(), Error> {
    info!("load patches from {}", directory.display());

    for entry in fs::read_dir(directory)? {
        let entry = entry?;

        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let block = parse_patch_dirname(&name)
            .ok_or_else(|| Error::Checkpoint(format!("unrecognized patch directory: {}", name)))?;

        for field_entry in fs::read_dir(entry.path())? {
            let field_entry = field_entry?;
            let field_name = field_entry.file_name().to_string_lossy().into_owned();
            let field = Field::from_name(&field_name)
                .ok_or_else(|| Error::Checkpoint(format!("unrecognized field: {}", field_name)))?;

            let file = File::open(field_entry.path())?;
            let array: Array = ciborium::de::from_reader(BufReader::new(file))
                .map_err(|e| Error::Checkpoint(e.to_string()))?;

            database.insert((block, field), array);
        }
    }
    Ok(())
}
