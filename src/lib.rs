// src/lib.rs
//
// Analyseur de fonctions — bibliothèque
// -------------------------------------
// Tout le calcul vit dans `noyau` ; le binaire (main.rs) n’en est qu’un pilote.

pub mod noyau;

pub use noyau::*;
