//! CSV decoding of the wallet and transaction inputs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Read;

use crate::{
    error::{ProcessingError, ProcessingResult},
    model::{Importable, Transaction, TransactionRecord, Wallet, WalletId, WalletRecord},
};

/// Decodes and validates every row; the first bad row aborts the import.
pub fn parse_records<I: Importable, R: Read>(reader: R) -> ProcessingResult<Vec<I::Model>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(malformed::<I>)?.clone();

    let mut models = Vec::new();
    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record).map_err(malformed::<I>)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: I = record
            .deserialize(Some(&headers))
            .map_err(|e| ProcessingError::MalformedRecord {
                source_name: I::SOURCE,
                line,
                reason: e.to_string(),
            })?;
        let model = raw
            .validate()
            .map_err(|reason| ProcessingError::MalformedRecord {
                source_name: I::SOURCE,
                line,
                reason,
            })?;
        models.push(model);
    }

    tracing::debug!(source = I::SOURCE, records = models.len(), "Parsed records");
    Ok(models)
}

/// Wallets keyed by id; a repeated id is an error.
pub fn parse_wallets<R: Read>(reader: R) -> ProcessingResult<HashMap<WalletId, Wallet>> {
    let mut wallets = HashMap::new();
    for wallet in parse_records::<WalletRecord, _>(reader)? {
        match wallets.entry(wallet.wallet_id.clone()) {
            Entry::Occupied(_) => return Err(ProcessingError::DuplicateWallet(wallet.wallet_id)),
            Entry::Vacant(slot) => {
                slot.insert(wallet);
            }
        }
    }
    Ok(wallets)
}

pub fn parse_transactions<R: Read>(reader: R) -> ProcessingResult<Vec<Transaction>> {
    parse_records::<TransactionRecord, _>(reader)
}

fn malformed<I: Importable>(error: csv::Error) -> ProcessingError {
    ProcessingError::MalformedRecord {
        source_name: I::SOURCE,
        line: error.position().map(|p| p.line()).unwrap_or_default(),
        reason: error.to_string(),
    }
}
