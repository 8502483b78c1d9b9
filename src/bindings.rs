use alloy::sol;

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ICoreRelayer {
        function registeredCoreRelayerContract(uint16 chainId) external view returns (bytes32);
        function getDefaultRelayProvider() external view returns (address);
        function quoteGasDeliveryFee(uint16 targetChain, uint32 gasLimit, address relayProvider)
            external
            view
            returns (uint256);
    }
);

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IMockIntegration {
        function sendMessage(
            bytes memory message,
            uint16 targetChainId,
            address targetAddress,
            address refundAddress
        ) external payable;
    }
);

sol!(
    #[allow(missing_docs)]
    interface IWormhole {
        event LogMessagePublished(
            address indexed sender,
            uint64 sequence,
            uint32 nonce,
            bytes payload,
            uint8 consistencyLevel
        );
    }
);
