//! Bindings for the energy-trading contract.
//!
//! The contract itself is deployed separately; only the methods and the event
//! the gateway touches are declared here.
use ethers::contract::abigen;

abigen!(
    EnergyTrading,
    r#"[
        function createTrade(uint256 energyAmount, uint256 price) external returns (uint256)
        function fulfillTrade(uint256 tradeId) external payable
        function getActiveTrades() external view returns (uint256[])
        function getTradeDetails(uint256 tradeId) external view returns (address seller, uint256 energyAmount, uint256 price, uint256 timestamp, bool active)
        function balances(address account) external view returns (uint256)
        function deposit() external payable
        function withdraw(uint256 amount) external
        event TradeCreated(uint256 indexed tradeId, address indexed seller, uint256 energyAmount, uint256 price)
    ]"#
);

/// Watt-hours per kilowatt-hour; prices are quoted per kWh.
pub const WH_PER_KWH: u64 = 1000;
