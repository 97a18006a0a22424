//! Uniswap V2 router bindings.
//!
//! Only the exact-input swap is bound; it shapes the synthetic payload
//! attached to mock quotes.

use alloy::sol;

sol! {
    interface IUniswapV2Router02 {
        function swapExactTokensForTokens(
            uint amountIn,
            uint amountOutMin,
            address[] calldata path,
            address to,
            uint deadline
        ) external returns (uint[] memory amounts);
    }
}
