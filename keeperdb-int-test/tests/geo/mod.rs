mod geo_range_query_test;
