pub mod mock_support;
