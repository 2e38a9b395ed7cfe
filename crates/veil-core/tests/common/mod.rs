pub mod mock_mirror;
