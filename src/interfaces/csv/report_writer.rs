use crate::application::views::LedgerReport;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    participant: u32,
    name: &'a str,
    balance: Decimal,
}

#[derive(Serialize)]
struct SettlementRow<'a> {
    payer_id: u32,
    receiver_id: u32,
    from: &'a str,
    to: &'a str,
    amount: Decimal,
}

/// Writes a ledger report as two CSV tables separated by a blank line:
/// balances first, then suggested settlements.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_report(&mut self, report: &LedgerReport) -> Result<()> {
        {
            let mut balances = table(&mut self.out, &["participant", "name", "balance"])?;
            for row in &report.balances {
                let mut balance = row.balance.value();
                balance.rescale(2);
                balances.serialize(BalanceRow {
                    participant: row.participant.0,
                    name: &row.name,
                    balance,
                })?;
            }
            balances.flush()?;
        }

        writeln!(self.out)?;

        let mut settlements = table(
            &mut self.out,
            &["payer_id", "receiver_id", "from", "to", "amount"],
        )?;
        for s in &report.settlements {
            settlements.serialize(SettlementRow {
                payer_id: s.payer_id.0,
                receiver_id: s.receiver_id.0,
                from: &s.from,
                to: &s.to,
                amount: s.amount.value(),
            })?;
        }
        settlements.flush()?;
        Ok(())
    }
}

// Headers are written by hand so empty tables still get one.
fn table<W: Write>(out: W, header: &[&str]) -> Result<csv::Writer<W>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(header)?;
    Ok(writer)
}
