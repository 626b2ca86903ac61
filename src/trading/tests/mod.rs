mod trading_service_tests;
