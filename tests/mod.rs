mod support;

mod stock_tests;
