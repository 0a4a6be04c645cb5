//! In-memory `Ledger` used by the backend tests.
//!
//! Executes the four vault instructions with the same checks, in the same
//! order, and with the same error codes as the deployed program. A rejected
//! transaction leaves every balance untouched (fee included).
//!
//! Like the runtime, a transaction may not leave a touched account with a
//! balance between zero and its rent-exempt minimum.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;

use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::Signature,
    system_program,
    transaction::{Transaction, TransactionError},
};

use super::{
    Ledger, LedgerError, VaultStateData, SIGNATURE_FEE_LAMPORTS, VAULT_STATE_DISCRIMINATOR, VAULT_STATE_LEN,
};
use crate::services::addresses::VaultAddresses;
use crate::services::transaction_builder::{
    CLOSE_DISCRIMINATOR, DEPOSIT_DISCRIMINATOR, INITIALIZE_DISCRIMINATOR, WITHDRAW_DISCRIMINATOR,
};

pub const FEE_LAMPORTS: u64 = SIGNATURE_FEE_LAMPORTS;

/// Rent-exempt minimum with the default cluster rent parameters.
pub fn rent(data_len: usize) -> u64 {
    (128 + data_len as u64) * 3_480 * 2
}

pub struct MockLedger {
    program_id: Pubkey,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    blockhash: Hash,
    clock: AtomicI64,
    /// Number of upcoming reads that fail with a transport error.
    pub fail_next_reads: AtomicU32,
    submitted: AtomicU32,
}

impl MockLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            accounts: Mutex::new(HashMap::new()),
            blockhash: Hash::new_unique(),
            clock: AtomicI64::new(1_700_000_000),
            fail_next_reads: AtomicU32::new(0),
            submitted: AtomicU32::new(0),
        }
    }

    pub fn airdrop(&self, address: &Pubkey, lamports: u64) {
        let mut accounts = self.accounts.lock().unwrap();
        credit(&mut accounts, address, lamports);
    }

    pub fn set_account(&self, address: Pubkey, account: Account) {
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn lamports(&self, address: &Pubkey) -> u64 {
        self.accounts
            .lock()
            .unwrap()
            .get(address)
            .map(|account| account.lamports)
            .unwrap_or(0)
    }

    pub fn submitted_count(&self) -> u32 {
        self.submitted.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<(), LedgerError> {
        let pending = self.fail_next_reads.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_next_reads.store(pending - 1, Ordering::SeqCst);
            return Err(LedgerError::Rpc("connection refused".to_string()));
        }
        Ok(())
    }

    fn execute(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        program: Pubkey,
        keys: &[Pubkey],
        signed: bool,
        data: &[u8],
    ) -> Result<(), InstructionError> {
        if program != self.program_id {
            return Err(InstructionError::IncorrectProgramId);
        }
        if keys.len() < 4 {
            return Err(InstructionError::NotEnoughAccountKeys);
        }
        if !signed {
            return Err(InstructionError::MissingRequiredSignature);
        }
        if keys[3] != system_program::id() {
            return Err(InstructionError::IncorrectProgramId);
        }
        if data.len() < 8 {
            return Err(InstructionError::Custom(100));
        }

        let (signer, state_key, vault_key) = (keys[0], keys[1], keys[2]);
        let expected = VaultAddresses::derive(&signer, &self.program_id);
        if state_key != expected.vault_state || vault_key != expected.vault {
            return Err(InstructionError::Custom(2006));
        }

        let (discriminator, args) = data.split_at(8);

        if discriminator == INITIALIZE_DISCRIMINATOR {
            if accounts.contains_key(&state_key) {
                return Err(InstructionError::Custom(0));
            }
            let state_rent = rent(VAULT_STATE_LEN);
            let reserve = rent(0);
            debit(accounts, &signer, state_rent + reserve).map_err(|_| InstructionError::Custom(1))?;

            let state = VaultStateData {
                owner: signer,
                state_bump: expected.state_bump,
                vault_bump: expected.vault_bump,
                created_at: self.clock.fetch_add(1, Ordering::SeqCst),
                total_deposited: 0,
                total_withdrawn: 0,
                lamports: state_rent,
            };
            accounts.insert(
                state_key,
                Account {
                    lamports: state_rent,
                    data: encode_state(&state),
                    owner: self.program_id,
                    executable: false,
                    rent_epoch: 0,
                },
            );
            credit(accounts, &vault_key, reserve);
            return Ok(());
        }

        let mut state = load_state(accounts, &state_key)?;
        if state.owner != signer {
            return Err(InstructionError::Custom(6003));
        }

        if discriminator == DEPOSIT_DISCRIMINATOR {
            let amount = parse_amount(args)?;
            if amount == 0 {
                return Err(InstructionError::Custom(6000));
            }
            debit(accounts, &signer, amount).map_err(|_| InstructionError::Custom(6002))?;
            credit(accounts, &vault_key, amount);
            state.total_deposited = state
                .total_deposited
                .checked_add(amount)
                .ok_or(InstructionError::Custom(6004))?;
            store_state(accounts, &state_key, &state);
        } else if discriminator == WITHDRAW_DISCRIMINATOR {
            let amount = parse_amount(args)?;
            if amount == 0 {
                return Err(InstructionError::Custom(6000));
            }
            let vault_lamports = accounts.get(&vault_key).map(|a| a.lamports).unwrap_or(0);
            if vault_lamports.saturating_sub(rent(0)) < amount {
                return Err(InstructionError::Custom(6001));
            }
            debit(accounts, &vault_key, amount).map_err(|_| InstructionError::Custom(6001))?;
            credit(accounts, &signer, amount);
            state.total_withdrawn = state
                .total_withdrawn
                .checked_add(amount)
                .ok_or(InstructionError::Custom(6004))?;
            store_state(accounts, &state_key, &state);
        } else if discriminator == CLOSE_DISCRIMINATOR {
            let vault_lamports = accounts.remove(&vault_key).map(|a| a.lamports).unwrap_or(0);
            let state_lamports = accounts.remove(&state_key).map(|a| a.lamports).unwrap_or(0);
            credit(accounts, &signer, vault_lamports + state_lamports);
        } else {
            return Err(InstructionError::Custom(101));
        }

        Ok(())
    }
}

impl Ledger for MockLedger {
    fn get_slot(&self) -> Result<u64, LedgerError> {
        self.check_read()?;
        Ok(self.submitted.load(Ordering::SeqCst) as u64 + 1)
    }

    fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        self.check_read()?;
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, LedgerError> {
        self.check_read()?;
        Ok(rent(data_len))
    }

    fn get_latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.check_read()?;
        Ok(self.blockhash)
    }

    fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        transaction.verify().map_err(LedgerError::Rejected)?;

        let message = &transaction.message;
        let keys = &message.account_keys;
        let payer = *keys
            .first()
            .ok_or(LedgerError::Rejected(TransactionError::AccountNotFound))?;

        let mut accounts = self.accounts.lock().unwrap().clone();
        let before: Vec<u64> = keys
            .iter()
            .map(|key| accounts.get(key).map(|a| a.lamports).unwrap_or(0))
            .collect();

        debit(&mut accounts, &payer, FEE_LAMPORTS)
            .map_err(|_| LedgerError::Rejected(TransactionError::InsufficientFundsForFee))?;

        for (index, instruction) in message.instructions.iter().enumerate() {
            let program = keys[instruction.program_id_index as usize];
            let instruction_keys: Vec<Pubkey> = instruction
                .accounts
                .iter()
                .map(|&i| keys[i as usize])
                .collect();
            let signed = instruction
                .accounts
                .first()
                .map(|&i| message.is_signer(i as usize))
                .unwrap_or(false);

            self.execute(&mut accounts, program, &instruction_keys, signed, &instruction.data)
                .map_err(|e| LedgerError::Rejected(TransactionError::InstructionError(index as u8, e)))?;
        }

        for (index, key) in keys.iter().enumerate() {
            if let Some(account) = accounts.get(key) {
                let below_rent = account.lamports > 0 && account.lamports < rent(account.data.len());
                if below_rent && account.lamports != before[index] {
                    return Err(LedgerError::Rejected(TransactionError::InsufficientFundsForRent {
                        account_index: index as u8,
                    }));
                }
            }
        }

        accounts.retain(|_, account| account.lamports > 0);
        *self.accounts.lock().unwrap() = accounts;
        self.submitted.fetch_add(1, Ordering::SeqCst);

        Ok(transaction.signatures[0])
    }
}

fn credit(accounts: &mut HashMap<Pubkey, Account>, address: &Pubkey, lamports: u64) {
    accounts
        .entry(*address)
        .or_insert_with(|| Account {
            lamports: 0,
            data: Vec::new(),
            owner: system_program::id(),
            executable: false,
            rent_epoch: 0,
        })
        .lamports += lamports;
}

fn debit(accounts: &mut HashMap<Pubkey, Account>, address: &Pubkey, lamports: u64) -> Result<(), ()> {
    match accounts.get_mut(address) {
        Some(account) if account.lamports >= lamports => {
            account.lamports -= lamports;
            Ok(())
        }
        _ => Err(()),
    }
}

fn parse_amount(args: &[u8]) -> Result<u64, InstructionError> {
    args.get(..8)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or(InstructionError::Custom(102))
}

fn load_state(accounts: &HashMap<Pubkey, Account>, address: &Pubkey) -> Result<VaultStateData, InstructionError> {
    let account = accounts.get(address).ok_or(InstructionError::Custom(3012))?;
    VaultStateData::decode(&account.data, account.lamports).map_err(|_| InstructionError::Custom(3002))
}

fn store_state(accounts: &mut HashMap<Pubkey, Account>, address: &Pubkey, state: &VaultStateData) {
    if let Some(account) = accounts.get_mut(address) {
        account.data = encode_state(state);
    }
}

pub fn encode_state(state: &VaultStateData) -> Vec<u8> {
    let mut data = Vec::with_capacity(VAULT_STATE_LEN);
    data.extend_from_slice(&VAULT_STATE_DISCRIMINATOR);
    data.extend_from_slice(state.owner.as_ref());
    data.push(state.state_bump);
    data.push(state.vault_bump);
    data.extend_from_slice(&state.created_at.to_le_bytes());
    data.extend_from_slice(&state.total_deposited.to_le_bytes());
    data.extend_from_slice(&state.total_withdrawn.to_le_bytes());
    data
}
