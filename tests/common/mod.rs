use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const ROSTER: &str = "tests/fixtures/roster.json";

/// Writes `rows` expenses rotating through participants 1 to 3.
pub fn generate_ledger(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["type", "payer", "receiver", "amount", "description"])?;

    for i in 0..rows {
        let payer = (i % 3 + 1).to_string();
        wtr.write_record(["expense", &payer, "", "3.00", &format!("expense {i}")])?;
    }

    wtr.flush()?;
    Ok(())
}
