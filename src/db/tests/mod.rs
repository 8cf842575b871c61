mod close;
mod migrations;
