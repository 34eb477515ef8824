use std::fs::{self, File};
use std::io::{BufWriter, Write};

use log::info;

use crate::array::Array;
use crate::config::RunConfig;
use crate::database::{Database, Field};
use crate::error::Error;
use crate::hydro::euler::Conserved;
use crate::ufunc;




/*
 * Legacy binary VTK structured-grid output. The (r, theta) mesh is projected
 * into the x-z plane with x = r sin(theta), z = r cos(theta), and the cell
 * primitives go down as scalar fields. Legacy VTK wants all binary payloads
 * big-endian, so every buffer is byte-swapped from host order on the way
 * out.
 */




// ============================================================================
fn write_swapped<W: Write>(stream: &mut W, buffer: &mut Vec<f32>) -> Result<(), Error> {
    for x in buffer.iter() {
        stream.write_all(&x.to_be_bytes())?;
    }
    buffer.clear();
    Ok(())
}

fn write_scalar<W: Write>(
    stream: &mut W,
    prim: &Array,
    component: usize,
    name: &str,
) -> Result<(), Error> {
    let (ni, nj, _) = prim.dim();
    let mut buffer = Vec::with_capacity(ni * nj);

    writeln!(stream, "SCALARS {} float 1", name)?;
    writeln!(stream, "LOOKUP_TABLE default")?;

    for j in 0..nj {
        for i in 0..ni {
            buffer.push(prim[(i, j, component)] as f32);
        }
    }
    write_swapped(stream, &mut buffer)
}




// ============================================================================
/// Write one VTK frame holding the full mesh and the primitive fields
/// density, radial velocity, and pressure.
///
pub fn write_vtk(database: &Database, cfg: &RunConfig, count: i64) -> Result<(), Error> {
    let filename = cfg.make_filename_vtk(count);
    info!("write VTK {}", filename.display());

    if let Some(parent) = filename.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut stream = BufWriter::new(File::create(&filename)?);

    let nb = cfg.num_blocks as i64;
    let vert = database.assemble(0, nb, 0, 1, 0, Field::VertCoords);
    let (mi, mj, _) = vert.dim();
    let mut buffer = Vec::with_capacity(mi * mj * 3);

    writeln!(stream, "# vtk DataFile Version 3.0")?;
    writeln!(stream, "corona2d")?;
    writeln!(stream, "BINARY")?;
    writeln!(stream, "DATASET STRUCTURED_GRID")?;
    writeln!(stream, "DIMENSIONS {} {} {}", mi, mj, 1)?;
    writeln!(stream, "POINTS {} float", mi * mj)?;

    for j in 0..mj {
        for i in 0..mi {
            let r = vert[(i, j, 0)];
            let q = vert[(i, j, 1)];
            buffer.push((r * q.sin()) as f32);
            buffer.push(0.0);
            buffer.push((r * q.cos()) as f32);
        }
    }
    write_swapped(&mut stream, &mut buffer)?;

    let cons_to_prim = ufunc::vfrom1(|u: [f64; 5]| {
        Conserved::from(u).to_primitive().map(|p| p.as_array())
    });
    let cons = database.assemble(0, nb, 0, 1, 0, Field::Conserved);
    let prim = cons_to_prim(cons.view())?;

    writeln!(stream, "CELL_DATA {}", prim.dim().0 * prim.dim().1)?;
    write_scalar(&mut stream, &prim, 0, "density")?;
    write_scalar(&mut stream, &prim, 1, "radial_velocity")?;
    write_scalar(&mut stream, &prim, 4, "pressure")?;

    Ok(())
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::*;
    use crate::config::RunConfig;
    use crate::setup;
    use tempfile::tempdir;

    #[test]
    fn frames_carry_the_expected_header_and_payload() {
        let tmp = tempdir().unwrap();
        let cfg = RunConfig {
            num_blocks: 2,
            nr: 4,
            outer_radius: 10.0,
            tfinal: 1.0,
            cpi: 0.0,
            vtki: 0.1,
            rk: 1,
            noise: 0.0,
            heating_rate: 0.0,
            cooling_rate: 0.0,
            num_threads: 1,
            restart: String::new(),
            outdir: tmp.path().to_str().unwrap().into(),
        };
        let database = setup::create_database(&cfg).unwrap();
        write_vtk(&database, &cfg, 3).unwrap();

        let bytes = fs::read(cfg.make_filename_vtk(3)).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        let (ni, nj) = cfg.block_extent();
        let (mi, mj) = (2 * ni + 1, nj + 1);

        assert!(text.starts_with("# vtk DataFile Version 3.0"));
        assert!(text.contains(&format!("DIMENSIONS {} {} 1", mi, mj)));
        assert!(text.contains(&format!("POINTS {} float", mi * mj)));
        assert!(text.contains(&format!("CELL_DATA {}", 2 * ni * nj)));
        assert!(text.contains("SCALARS density float 1"));
        assert!(text.contains("SCALARS radial_velocity float 1"));
        assert!(text.contains("SCALARS pressure float 1"));

        // Point payload alone is 12 bytes per vertex
        assert!(bytes.len() > mi * mj * 12);
    }
}
