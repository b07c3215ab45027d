//! # Abstract syntax
//!
//! The parser produces untyped s-expressions. They are turned into typed
//! expressions by [`super::build_expr`].

use super::lexer::{Lexer, Tok};
use crate::{Error, Position, Result};
use std::fmt;

/// A node of the abstract syntax tree.
#[derive(Clone, PartialEq)]
pub enum AstNode {
    /// A symbol or numeral.
    Atom { name: String, pos: Position },
    /// A quoted string, used for outfix delimiters.
    Str { s: String, pos: Position },
    /// A parenthesized list.
    List { items: Vec<AstNode>, pos: Position },
}

impl AstNode {
    pub fn pos(&self) -> Position {
        match self {
            AstNode::Atom { pos, .. } | AstNode::Str { pos, .. } | AstNode::List { pos, .. } => {
                *pos
            }
        }
    }

    /// The name, if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            AstNode::Atom { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The items, if this is a list.
    pub fn as_list(&self) -> Option<&[AstNode]> {
        match self {
            AstNode::List { items, .. } => Some(items),
            _ => None,
        }
    }

    /// The head atom of a non-empty list.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_atom()
    }
}

/// Parse all the s-expressions of `src`.
pub fn parse_ast(src: &str) -> Result<Vec<AstNode>> {
    let mut lexer = Lexer::new(src);
    let mut res = vec![];
    loop {
        if lexer.cur() == Tok::EOF {
            break;
        }
        res.push(parse_node(&mut lexer)?);
    }
    Ok(res)
}

/// Parse exactly one s-expression from `src`.
pub fn parse_one(src: &str) -> Result<AstNode> {
    let mut lexer = Lexer::new(src);
    let n = parse_node(&mut lexer)?;
    lexer.eat(Tok::EOF, "after expression")?;
    Ok(n)
}

fn parse_node(lexer: &mut Lexer) -> Result<AstNode> {
    let pos = lexer.cur_pos();
    match lexer.cur() {
        Tok::LPAREN => {
            lexer.next();
            let mut items = vec![];
            loop {
                match lexer.cur() {
                    Tok::RPAREN => {
                        lexer.next();
                        break;
                    }
                    Tok::EOF => {
                        return Err(Error::new_parse("unclosed '('".to_string(), pos));
                    }
                    _ => items.push(parse_node(lexer)?),
                }
            }
            if items.is_empty() {
                return Err(Error::new_parse("empty list".to_string(), pos));
            }
            Ok(AstNode::List { items, pos })
        }
        Tok::SYM(s) | Tok::NUM(s) => {
            lexer.next();
            Ok(AstNode::Atom {
                name: s.to_string(),
                pos,
            })
        }
        Tok::QUOTED_STR(s) => {
            lexer.next();
            Ok(AstNode::Str {
                s: s.to_string(),
                pos,
            })
        }
        Tok::RPAREN => Err(Error::new_parse("unexpected ')'".to_string(), pos)),
        Tok::EOF => Err(Error::new_parse("unexpected end of input".to_string(), pos)),
        Tok::ERROR(c) => Err(Error::new_parse(
            format!("invalid char {:?}", c as char),
            pos,
        )),
    }
}

impl fmt::Debug for AstNode {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AstNode::Atom { name, .. } => write!(out, "{}", name),
            AstNode::Str { s, .. } => write!(out, "{:?}", s),
            AstNode::List { items, .. } => {
                write!(out, "(")?;
                for (i, x) in items.iter().enumerate() {
                    if i > 0 {
                        write!(out, " ")?;
                    }
                    write!(out, "{:?}", x)?;
                }
                write!(out, ")")
            }
        }
    }
}
