pub mod badges;
pub mod indexers;
pub mod results;
pub mod search;
