mod batch_test;
