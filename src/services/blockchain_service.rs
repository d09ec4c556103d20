use bigdecimal::BigDecimal;
use chrono::{SecondsFormat, TimeZone, Utc};
use ethers::abi::{Detokenize, RawLog};
use ethers::contract::{ContractCall, ContractError, EthEvent};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{TransactionReceipt, U256};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use crate::config::{ConfigError, GatewayConfig};
use crate::contract::{EnergyTrading, TradeCreatedFilter, WH_PER_KWH};
use crate::models::outcome::{ChainError, ChainResult, Outcome};
use crate::models::trade::{Trade, TradeCreated, TransactionSubmitted};
use crate::models::transaction::{TransactionStatus, TxState};
use crate::models::types::{address_to_hex, hash_to_hex, is_hash_hex, Address, Hash};
use crate::services::confirmation_service::ConfirmationTracker;
use crate::services::demo_service::{self, DemoLedger};
use crate::units::{format_base_units, to_base_units};

/// Facade over the energy-trading contract.
///
/// Mutating operations return an [`Outcome`] and never an error; read
/// operations fall back to an empty list or a zero balance. The `demo_*`
/// variants skip the chain entirely when demo mode is on and delegate to the
/// live call otherwise.
pub struct BlockchainClient<M> {
    client: Arc<M>,
    contract: EnergyTrading<M>,
    demo_mode: bool,
    demo_account: Address,
    demo_latency: Duration,
    gas_limit: U256,
    ledger: DemoLedger,
    tracker: ConfirmationTracker,
    submitted: AtomicU64,
}

impl BlockchainClient<Provider<Http>> {
    /// Builds a facade talking JSON-RPC over HTTP to `config.rpc_url`.
    pub fn connect(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str()).map_err(|e| ConfigError::Invalid {
            name: "RPC_URL",
            value: config.rpc_url.clone(),
            reason: e.to_string(),
        })?;

        if config.demo_mode {
            log::info!("Blockchain client running in DEMO mode; no transactions will reach {}", config.rpc_url);
        } else {
            log::info!("Connected to blockchain node at {}", config.rpc_url);
        }

        Ok(BlockchainClient::new(Arc::new(provider), config))
    }
}

impl<M: Middleware + 'static> BlockchainClient<M> {
    pub fn new(client: Arc<M>, config: &GatewayConfig) -> Self {
        BlockchainClient {
            contract: EnergyTrading::new(config.contract_address, client.clone()),
            client,
            demo_mode: config.demo_mode,
            demo_account: config.demo_account,
            demo_latency: config.demo_latency,
            gas_limit: U256::from(config.gas_limit),
            ledger: DemoLedger::new(),
            tracker: ConfirmationTracker::new(config.confirmation_policy),
            submitted: AtomicU64::new(0),
        }
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    /// Number of transactions (real or simulated) this facade has produced.
    pub fn transactions_submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    // ---------------------------------------------------------------------
    // Live operations
    // ---------------------------------------------------------------------

    /// First account managed by the connected node.
    pub async fn get_account(&self) -> ChainResult<Address> {
        let accounts = self.client.get_accounts().await.map_err(provider_error)?;
        accounts.into_iter().next().ok_or(ChainError::NoAccounts)
    }

    pub async fn create_energy_trade(&self, energy_amount: u64, price_per_kwh: &BigDecimal) -> Outcome<TradeCreated> {
        let result = self.try_create_energy_trade(energy_amount, price_per_kwh).await;
        match &result {
            Ok(created) => log::info!("Trade created on blockchain: {}", created.transaction_hash),
            Err(e) => log::error!("Error creating energy trade: {}", e),
        }
        result.into()
    }

    async fn try_create_energy_trade(&self, energy_amount: u64, price_per_kwh: &BigDecimal) -> ChainResult<TradeCreated> {
        let account = self.get_account().await?;
        let price = to_base_units(price_per_kwh)?; // Price per kWh in wei

        let call = self
            .contract
            .create_trade(U256::from(energy_amount), price)
            .from(account)
            .gas(self.gas_limit);
        let receipt = self.submit(&call).await?;

        let event = receipt
            .logs
            .iter()
            .find_map(|log| {
                let raw = RawLog { topics: log.topics.clone(), data: log.data.to_vec() };
                TradeCreatedFilter::decode_log(&raw).ok()
            })
            .ok_or(ChainError::MissingEvent)?;

        Ok(TradeCreated {
            trade_id: u256_to_u64(event.trade_id)?,
            transaction_hash: hash_to_hex(&receipt.transaction_hash),
        })
    }

    /// Buys the whole of trade `trade_id`, paying `energy * price / 1000` wei.
    pub async fn fulfill_energy_trade(&self, trade_id: &str) -> Outcome<TransactionSubmitted> {
        let result = self.try_fulfill_energy_trade(trade_id).await;
        match &result {
            Ok(tx) => log::info!("Trade {} fulfilled on blockchain: {}", trade_id, tx.transaction_hash),
            Err(e) => log::error!("Error fulfilling energy trade {}: {}", trade_id, e),
        }
        result.into()
    }

    async fn try_fulfill_energy_trade(&self, trade_id: &str) -> ChainResult<TransactionSubmitted> {
        let account = self.get_account().await?;
        let id = parse_trade_id(trade_id)?;

        let (_seller, energy_amount, price, _timestamp, _active) =
            self.contract.get_trade_details(id).call().await.map_err(contract_error)?;
        let total_price = energy_amount.checked_mul(price).ok_or(ChainError::Overflow)? / U256::from(WH_PER_KWH);

        let call = self
            .contract
            .fulfill_trade(id)
            .from(account)
            .value(total_price)
            .gas(self.gas_limit);
        let receipt = self.submit(&call).await?;

        Ok(TransactionSubmitted { transaction_hash: hash_to_hex(&receipt.transaction_hash) })
    }

    /// Active trades as listed by the contract; empty if the chain cannot be read.
    pub async fn get_active_trades(&self) -> Vec<Trade> {
        match self.try_get_active_trades().await {
            Ok(trades) => trades,
            Err(e) => {
                log::error!("Error getting active trades: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_get_active_trades(&self) -> ChainResult<Vec<Trade>> {
        let ids = self.contract.get_active_trades().call().await.map_err(contract_error)?;
        let mut trades = Vec::with_capacity(ids.len());

        // One details call per trade, in listing order
        for id in ids {
            let (seller, energy_amount, price, timestamp, _active) =
                self.contract.get_trade_details(id).call().await.map_err(contract_error)?;
            trades.push(Trade {
                id: u256_to_u64(id)?,
                seller: address_to_hex(&seller),
                energy_amount: u256_to_u64(energy_amount)?,
                price: format_base_units(price),
                timestamp: unix_seconds_to_iso(u256_to_u64(timestamp)?)?,
            });
        }

        Ok(trades)
    }

    /// Contract balance of `address` (or of the active account) in display units; `"0"` on failure.
    pub async fn get_balance(&self, address: Option<Address>) -> String {
        let result = async {
            let address = match address {
                Some(address) => address,
                None => self.get_account().await?,
            };
            let balance = self.contract.balances(address).call().await.map_err(contract_error)?;
            Ok::<_, ChainError>(format_base_units(balance))
        }
        .await;

        result.unwrap_or_else(|e| {
            log::error!("Error getting balance: {}", e);
            "0".to_string()
        })
    }

    pub async fn deposit(&self, amount: &BigDecimal) -> Outcome<TransactionSubmitted> {
        let result = async {
            let account = self.get_account().await?;
            let value = to_base_units(amount)?;
            let call = self.contract.deposit().from(account).value(value).gas(self.gas_limit);
            let receipt = self.submit(&call).await?;
            Ok::<_, ChainError>(TransactionSubmitted { transaction_hash: hash_to_hex(&receipt.transaction_hash) })
        }
        .await;

        log_outcome("Deposit", &result);
        result.into()
    }

    pub async fn withdraw(&self, amount: &BigDecimal) -> Outcome<TransactionSubmitted> {
        let result = async {
            let account = self.get_account().await?;
            let value = to_base_units(amount)?;
            let call = self.contract.withdraw(value).from(account).gas(self.gas_limit);
            let receipt = self.submit(&call).await?;
            Ok::<_, ChainError>(TransactionSubmitted { transaction_hash: hash_to_hex(&receipt.transaction_hash) })
        }
        .await;

        log_outcome("Withdrawal", &result);
        result.into()
    }

    /// Confirmation count of a mined transaction, derived from the current head.
    pub async fn get_transaction_status(&self, hash: &str) -> ChainResult<TransactionStatus> {
        let tx_hash = Some(hash)
            .filter(|h| is_hash_hex(h))
            .and_then(|h| Hash::from_str(h).ok())
            .ok_or_else(|| ChainError::InvalidHash(hash.to_string()))?;
        let receipt = self.client.get_transaction_receipt(tx_hash).await.map_err(provider_error)?;

        let (confirmations, mined_in) = match receipt.and_then(|r| r.block_number) {
            Some(block) => {
                let head = self.client.get_block_number().await.map_err(provider_error)?;
                (head.as_u64().saturating_sub(block.as_u64()) + 1, Some(block.as_u64()))
            }
            None => (0, None),
        };
        let status = TxState::for_confirmations(confirmations);

        Ok(TransactionStatus {
            hash: hash.to_string(),
            status,
            confirmations,
            block_number: if status == TxState::Confirmed { mined_in } else { None },
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    // Sends a state-changing call and waits for it to be mined.
    async fn submit<D: Detokenize>(&self, call: &ContractCall<M, D>) -> ChainResult<TransactionReceipt> {
        let pending = call.send().await.map_err(contract_error)?;
        let receipt = pending.await.map_err(provider_error)?.ok_or(ChainError::Dropped)?;
        self.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(receipt)
    }

    // ---------------------------------------------------------------------
    // Demo variants
    // ---------------------------------------------------------------------

    pub async fn demo_get_account(&self) -> ChainResult<Address> {
        if !self.demo_mode {
            return self.get_account().await;
        }
        Ok(self.demo_account)
    }

    pub async fn demo_create_energy_trade(&self, energy_amount: u64, price_per_kwh: &BigDecimal) -> Outcome<TradeCreated> {
        if !self.demo_mode {
            return self.create_energy_trade(energy_amount, price_per_kwh).await;
        }

        self.simulate_latency().await;
        let created = {
            let mut rng = rand::thread_rng();
            TradeCreated {
                trade_id: demo_service::generate_trade_id(&mut rng),
                transaction_hash: demo_service::generate_transaction_hash(&mut rng),
            }
        };
        self.submitted.fetch_add(1, Ordering::Relaxed);

        log::info!("Demo trade created: {} ({} Wh at {} per kWh)", created.transaction_hash, energy_amount, price_per_kwh);
        Outcome::Success(created)
    }

    pub async fn demo_fulfill_energy_trade(&self, trade_id: &str) -> Outcome<TransactionSubmitted> {
        if !self.demo_mode {
            return self.fulfill_energy_trade(trade_id).await;
        }

        self.simulate_latency().await;
        let tx = self.demo_transaction();

        log::info!("Demo trade {} fulfilled: {}", trade_id, tx.transaction_hash);
        Outcome::Success(tx)
    }

    pub async fn demo_get_active_trades(&self) -> Vec<Trade> {
        if !self.demo_mode {
            return self.get_active_trades().await;
        }
        demo_service::generate_active_trades(&mut rand::thread_rng(), Utc::now())
    }

    pub async fn demo_get_balance(&self, address: Option<Address>) -> String {
        if !self.demo_mode {
            return self.get_balance(address).await;
        }
        format_base_units(self.ledger.balance(&address.unwrap_or(self.demo_account)))
    }

    pub async fn demo_deposit(&self, amount: &BigDecimal) -> Outcome<TransactionSubmitted> {
        if !self.demo_mode {
            return self.deposit(amount).await;
        }

        self.simulate_latency().await;
        let result = to_base_units(amount)
            .and_then(|value| self.ledger.deposit(self.demo_account, value))
            .map(|_| self.demo_transaction());

        log_outcome("Demo deposit", &result);
        result.into()
    }

    pub async fn demo_withdraw(&self, amount: &BigDecimal) -> Outcome<TransactionSubmitted> {
        if !self.demo_mode {
            return self.withdraw(amount).await;
        }

        self.simulate_latency().await;
        let result = to_base_units(amount)
            .and_then(|value| self.ledger.withdraw(self.demo_account, value))
            .map(|_| self.demo_transaction());

        log_outcome("Demo withdrawal", &result);
        result.into()
    }

    pub async fn demo_get_transaction_status(&self, hash: &str) -> ChainResult<TransactionStatus> {
        if !self.demo_mode {
            return self.get_transaction_status(hash).await;
        }
        if !is_hash_hex(hash) {
            return Err(ChainError::InvalidHash(hash.to_string()));
        }
        Ok(self.tracker.poll(hash))
    }

    async fn simulate_latency(&self) {
        if !self.demo_latency.is_zero() {
            tokio::time::sleep(self.demo_latency).await;
        }
    }

    fn demo_transaction(&self) -> TransactionSubmitted {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        TransactionSubmitted { transaction_hash: demo_service::generate_transaction_hash(&mut rand::thread_rng()) }
    }
}

fn log_outcome(action: &str, result: &ChainResult<TransactionSubmitted>) {
    match result {
        Ok(tx) => log::info!("{} successful: {}", action, tx.transaction_hash),
        Err(e) => log::error!("{} failed: {}", action, e),
    }
}

fn provider_error<E: std::error::Error>(e: E) -> ChainError {
    ChainError::Provider(e.to_string())
}

fn contract_error<M: Middleware>(e: ContractError<M>) -> ChainError {
    ChainError::Contract(e.to_string())
}

fn parse_trade_id(trade_id: &str) -> ChainResult<U256> {
    U256::from_dec_str(trade_id.trim()).map_err(|_| ChainError::InvalidTradeId(trade_id.to_string()))
}

fn u256_to_u64(value: U256) -> ChainResult<u64> {
    u64::try_from(value).map_err(|_| ChainError::Overflow)
}

fn unix_seconds_to_iso(seconds: u64) -> ChainResult<String> {
    let secs = i64::try_from(seconds).map_err(|_| ChainError::Overflow)?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or(ChainError::Overflow)
}
