// 外部系統的具體實作：CSV 輸入、檔案存儲、LP 求解器
pub mod csv_provider;
pub mod solver;
pub mod storage;
