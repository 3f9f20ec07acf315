//! Uniswap V2 style contract bindings (QuickSwap V2 shares the ABI).

use alloy::sol;

// Re-export QuickSwap V2 addresses from constants module.
pub use crate::ethereum::constants::{QUICKSWAP_V2_FACTORY, QUICKSWAP_V2_ROUTER};

// Uniswap V2 Router interface (view subset)
sol! {
    interface IUniswapV2Router02 {
        function getAmountsOut(
            uint amountIn,
            address[] calldata path
        ) external view returns (uint[] memory amounts);
    }
}

// Uniswap V2 Factory interface
sol! {
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

// Uniswap V2 Pair interface
sol! {
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}
