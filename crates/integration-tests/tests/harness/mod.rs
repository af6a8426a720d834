pub mod mock_flux;
