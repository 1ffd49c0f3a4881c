pub mod ledger_reader;
pub mod report_writer;
