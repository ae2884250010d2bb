mod console;
mod controls;
mod editors;
mod panels;
