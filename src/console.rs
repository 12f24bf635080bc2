//! Line-oriented command loop driving a [`Library`].

use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use colored::Colorize;
use thiserror::Error;
use tracing::debug;

use crate::{
    book::BookId,
    error::LibraryError,
    library::Library,
    persistence::SnapshotStore,
    visitor::VisitorId,
};

/// Command menu shown before every prompt
const BANNER: &str = concat!(
    "\nAvailable commands: \n\n",
    "Visitors Commands\n",
    "[VISITORS] [ADDVISITOR] [RENT] \n",
    "[RETURN]\n\n",
    "Books Commands\n",
    "[CREATE] [READ] [SEARCH] \n",
    "[UPDATE] [DELETE] [EXIT]\n",
);

/// Commands accepted at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// List visitors and what they are renting
    Visitors,
    /// Register a visitor
    AddVisitor,
    /// Rent a book to a visitor
    Rent,
    /// Return a rented book
    Return,
    /// Add a book
    Create,
    /// List all books
    Read,
    /// Search books by title
    Search,
    /// Change a book's title and author
    Update,
    /// Remove a book
    Delete,
    /// End the session
    Exit,
}

/// Input that names no known command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command `{0}`")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VISITORS" => Ok(Self::Visitors),
            "ADDVISITOR" => Ok(Self::AddVisitor),
            "RENT" => Ok(Self::Rent),
            "RETURN" => Ok(Self::Return),
            "CREATE" => Ok(Self::Create),
            "READ" => Ok(Self::Read),
            "SEARCH" => Ok(Self::Search),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            "EXIT" => Ok(Self::Exit),
            _ => Err(UnknownCommand(s.trim().to_string())),
        }
    }
}

/// Whether the loop keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Prompt for the next command
    Continue,
    /// Stop: `EXIT` or end of input
    Exit,
}

/// Answer to an id prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdAnswer {
    /// A valid number
    Id(u32),
    /// Not a number; already reported
    Invalid,
    /// Input ended before an answer
    EndOfInput,
}

/// Interactive session over any line reader and writer
#[derive(Debug)]
pub struct Console<R, W> {
    /// Source of user lines
    input: R,
    /// Destination of prompts and results
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console over `input` and `output`
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output writer
    #[must_use]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Read and execute commands until `EXIT` or end of input
    ///
    /// Library errors are printed and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if reading input or writing output fails.
    pub fn run<S: SnapshotStore>(&mut self, library: &mut Library<S>) -> io::Result<()> {
        loop {
            writeln!(self.output, "{}", BANNER.green())?;
            let Some(line) = self.prompt("Enter command: ")? else {
                break;
            };
            let flow = match line.parse::<Command>() {
                Ok(command) => {
                    debug!(?command, "dispatching");
                    self.dispatch(command, library)?
                }
                Err(unknown) => {
                    debug!(%unknown, "rejected input");
                    writeln!(self.output, "Unknown command.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Run one command
    fn dispatch<S: SnapshotStore>(
        &mut self,
        command: Command,
        library: &mut Library<S>,
    ) -> io::Result<Flow> {
        match command {
            Command::Visitors => self.show_visitors(library),
            Command::AddVisitor => self.add_visitor(library),
            Command::Rent => self.rent(library),
            Command::Return => self.return_book(library),
            Command::Create => self.create(library),
            Command::Read => self.read(library),
            Command::Search => self.search(library),
            Command::Update => self.update(library),
            Command::Delete => self.delete(library),
            Command::Exit => {
                writeln!(self.output, "Goodbye!")?;
                Ok(Flow::Exit)
            }
        }
    }

    /// `VISITORS`
    fn show_visitors<S: SnapshotStore>(&mut self, library: &Library<S>) -> io::Result<Flow> {
        for visitor in library.visitors() {
            writeln!(self.output, "{visitor}")?;
        }
        self.wait_for_return()
    }

    /// `ADDVISITOR`
    fn add_visitor<S: SnapshotStore>(&mut self, library: &mut Library<S>) -> io::Result<Flow> {
        let Some(name) = self.prompt("Enter visitor name: ")? else {
            return Ok(Flow::Exit);
        };
        match library.add_visitor(&name) {
            Ok(_) => writeln!(self.output, "Visitor added.")?,
            Err(error) => self.report(&error)?,
        }
        Ok(Flow::Continue)
    }

    /// `RENT`
    fn rent<S: SnapshotStore>(&mut self, library: &mut Library<S>) -> io::Result<Flow> {
        let visitor = match self.prompt_id("Visitor ID: ")? {
            IdAnswer::Id(raw) => VisitorId(raw),
            IdAnswer::Invalid => return Ok(Flow::Continue),
            IdAnswer::EndOfInput => return Ok(Flow::Exit),
        };
        if library.visitor(visitor).is_none() {
            self.report(&LibraryError::VisitorNotFound(visitor))?;
            return Ok(Flow::Continue);
        }

        let book = match self.prompt_id("Book ID to rent: ")? {
            IdAnswer::Id(raw) => BookId(raw),
            IdAnswer::Invalid => return Ok(Flow::Continue),
            IdAnswer::EndOfInput => return Ok(Flow::Exit),
        };
        match library.rent(visitor, book) {
            Ok(()) => writeln!(self.output, "Book rented.")?,
            Err(error) => self.report(&error)?,
        }
        Ok(Flow::Continue)
    }

    /// `RETURN`
    fn return_book<S: SnapshotStore>(&mut self, library: &mut Library<S>) -> io::Result<Flow> {
        let visitor = match self.prompt_id("Visitor ID: ")? {
            IdAnswer::Id(raw) => VisitorId(raw),
            IdAnswer::Invalid => return self.wait_for_return(),
            IdAnswer::EndOfInput => return Ok(Flow::Exit),
        };
        if library.visitor(visitor).is_none() {
            self.report(&LibraryError::VisitorNotFound(visitor))?;
            return self.wait_for_return();
        }

        let book = match self.prompt_id("Book ID to return: ")? {
            IdAnswer::Id(raw) => BookId(raw),
            IdAnswer::Invalid => return self.wait_for_return(),
            IdAnswer::EndOfInput => return Ok(Flow::Exit),
        };
        match library.return_book(visitor, book) {
            Ok(()) => writeln!(self.output, "Book returned.")?,
            Err(error) => self.report(&error)?,
        }
        self.wait_for_return()
    }

    /// `CREATE`
    fn create<S: SnapshotStore>(&mut self, library: &mut Library<S>) -> io::Result<Flow> {
        let Some(title) = self.prompt("Enter title: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(author) = self.prompt("Enter author: ")? else {
            return Ok(Flow::Exit);
        };
        match library.create_book(&title, &author) {
            Ok(book) => writeln!(self.output, "Book created: {book}")?,
            Err(error) => self.report(&error)?,
        }
        Ok(Flow::Continue)
    }

    /// `READ`
    fn read<S: SnapshotStore>(&mut self, library: &Library<S>) -> io::Result<Flow> {
        let books = library.books();
        if books.is_empty() {
            writeln!(self.output, "No books found.")?;
        }
        for book in books {
            writeln!(self.output, "{book}")?;
        }
        self.wait_for_return()
    }

    /// `SEARCH`
    fn search<S: SnapshotStore>(&mut self, library: &Library<S>) -> io::Result<Flow> {
        let Some(query) = self.prompt("Enter title keyword to search: ")? else {
            return Ok(Flow::Exit);
        };
        let found = library.search_books(&query);
        if found.is_empty() {
            writeln!(self.output, "No books found matching your search.")?;
        }
        for book in found {
            writeln!(self.output, "{book}")?;
        }
        self.wait_for_return()
    }

    /// `UPDATE`
    fn update<S: SnapshotStore>(&mut self, library: &mut Library<S>) -> io::Result<Flow> {
        let answer = self.prompt_id("Enter ID to update: ")?;
        if answer == IdAnswer::EndOfInput {
            return Ok(Flow::Exit);
        }
        let Some(title) = self.prompt("Enter new title: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(author) = self.prompt("Enter new author: ")? else {
            return Ok(Flow::Exit);
        };
        let IdAnswer::Id(raw) = answer else {
            return Ok(Flow::Continue);
        };
        let id = BookId(raw);
        match library.update_book(id, &title, &author) {
            Ok(book) => writeln!(self.output, "Book updated: {book}")?,
            Err(error) => self.report(&error)?,
        }
        Ok(Flow::Continue)
    }

    /// `DELETE`
    fn delete<S: SnapshotStore>(&mut self, library: &mut Library<S>) -> io::Result<Flow> {
        let id = match self.prompt_id("Enter ID to delete: ")? {
            IdAnswer::Id(raw) => BookId(raw),
            IdAnswer::Invalid => return Ok(Flow::Continue),
            IdAnswer::EndOfInput => return Ok(Flow::Exit),
        };
        match library.delete_book(id) {
            Ok(_) => writeln!(self.output, "Book deleted: {id}")?,
            Err(error) => self.report(&error)?,
        }
        Ok(Flow::Continue)
    }

    /// Print a library error and keep going
    fn report(&mut self, error: &LibraryError) -> io::Result<()> {
        let message = error.to_string().red();
        if error.is_persistence_failure() {
            writeln!(self.output, "{message} (change kept in memory)")
        } else {
            writeln!(self.output, "{message}")
        }
    }

    /// Read one line without its terminator; `None` at end of input
    ///
    /// Bytes that are not UTF-8 are replaced, so a garbled line is just an
    /// unknown answer.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Show `text` and read the answer
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Prompt for a numeric id, reporting answers that are not numbers
    fn prompt_id(&mut self, text: &str) -> io::Result<IdAnswer> {
        let Some(answer) = self.prompt(text)? else {
            return Ok(IdAnswer::EndOfInput);
        };
        if let Ok(id) = answer.trim().parse::<u32>() {
            Ok(IdAnswer::Id(id))
        } else {
            writeln!(self.output, "{}", "Invalid ID.".red())?;
            Ok(IdAnswer::Invalid)
        }
    }

    /// Pause until an empty line or end of input
    fn wait_for_return(&mut self) -> io::Result<Flow> {
        loop {
            match self.prompt("\npress Enter to return: ")? {
                None => return Ok(Flow::Exit),
                Some(line) if line.is_empty() => return Ok(Flow::Continue),
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::RentalPolicy, persistence::MemorySnapshotStore};

    /// Run a whole session over `input` and return everything printed
    fn run_session(library: &mut Library<MemorySnapshotStore>, input: &[u8]) -> String {
        let mut console = Console::new(input, Vec::new());
        let result = console.run(library);
        assert!(result.is_ok());
        String::from_utf8_lossy(&console.into_output()).into_owned()
    }

    /// Empty in-memory library
    fn empty_library() -> Library<MemorySnapshotStore> {
        Library::open(MemorySnapshotStore::new(), RentalPolicy::Permissive).0
    }

    /// How many times the session paused
    fn pauses(output: &str) -> usize {
        output.matches("press Enter to return").count()
    }

    #[test]
    fn test_command_parsing_ignores_case_and_whitespace() {
        let padded = "  addVisitor \t".parse::<Command>();
        assert_eq!(padded, Ok(Command::AddVisitor));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Exit));
        let unknown = UnknownCommand("borrow".to_string());
        assert_eq!("borrow".parse::<Command>(), Err(unknown));
    }

    #[test]
    fn test_unknown_command_message() {
        let unknown = UnknownCommand("dance".to_string());
        assert_eq!(unknown.to_string(), "unknown command `dance`");
    }

    #[test]
    fn test_unknown_command_then_end_of_input() {
        let mut library = empty_library();
        let output = run_session(&mut library, b"dance\n");
        assert!(output.contains("Unknown command."));
        assert!(!output.contains("Goodbye!"));
    }

    #[test]
    fn test_non_utf8_line_is_an_unknown_command() {
        let mut library = empty_library();
        let output = run_session(&mut library, b"\xff\xfe\nREAD\n\nexit\n");
        assert!(output.contains("Unknown command."));
        assert!(output.contains("No books found."));
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn test_create_and_read_session() {
        let mut library = empty_library();
        let input = b"create\nDune\nHerbert\nREAD\nnot yet\n\nexit\n";
        let output = run_session(&mut library, input);
        let created = "Book created: ID: 1, Title: Dune, Author: Herbert";
        assert!(output.contains(created));
        assert_eq!(pauses(&output), 2);
        assert!(output.contains("Goodbye!"));
        assert_eq!(library.books().len(), 1);
    }

    #[test]
    fn test_search_reports_no_match() {
        let mut library = empty_library();
        let input = b"create\nDune\nHerbert\nsearch\nzzz\n\nsearch\ndun\n\nexit\n";
        let output = run_session(&mut library, input);
        assert!(output.contains("No books found matching your search."));
        assert!(output.contains("ID: 1, Title: Dune, Author: Herbert"));
    }

    #[test]
    fn test_rent_return_session() {
        let mut library = empty_library();
        let input = b"create\nDune\nHerbert\naddvisitor\nAlice\n\
            rent\n1\n1\nrent\n1\n1\nvisitors\n\nreturn\n1\n1\n\nexit\n";
        let output = run_session(&mut library, input);
        assert!(output.contains("Visitor added."));
        assert!(output.contains("Book rented."));
        assert!(output.contains("Visitor 1 already rented book 1"));
        assert!(output.contains("ID: 1, Name: Alice, Renting: Book ID(s) 1"));
        assert!(output.contains("Book returned."));
    }

    #[test]
    fn test_visitors_on_empty_ledger_only_pauses() {
        let mut library = empty_library();
        let output = run_session(&mut library, b"visitors\n\nexit\n");
        assert!(!output.contains("ID: "));
        assert!(!output.contains("No visitors"));
        assert_eq!(pauses(&output), 1);
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn test_rent_unknown_visitor_skips_book_prompt() {
        let mut library = empty_library();
        let output = run_session(&mut library, b"rent\n5\nexit\n");
        assert!(output.contains("Visitor 5 not found"));
        assert!(!output.contains("Book ID to rent"));
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn test_return_with_invalid_ids_still_pauses() {
        let mut library = empty_library();
        let input = b"addvisitor\nAlice\nreturn\nx\n\nreturn\n1\nabc\n\nexit\n";
        let output = run_session(&mut library, input);
        assert_eq!(output.matches("Invalid ID.").count(), 2);
        assert_eq!(pauses(&output), 2);
        assert!(output.contains("Goodbye!"));
        assert_eq!(library.store().backend().writes(), 1);
    }

    #[test]
    fn test_invalid_id_returns_to_prompt() {
        let mut library = empty_library();
        let output = run_session(&mut library, b"delete\nabc\ndelete\n1\nexit\n");
        assert!(output.contains("Invalid ID."));
        assert!(output.contains("Book 1 not found"));
        assert_eq!(library.store().backend().writes(), 0);
    }

    #[test]
    fn test_update_and_delete_session() {
        let mut library = empty_library();
        let input = b"create\nDune\nHerbert\nupdate\n1\nEmma\nAusten\ndelete\n1\nexit\n";
        let output = run_session(&mut library, input);
        let updated = "Book updated: ID: 1, Title: Emma, Author: Austen";
        assert!(output.contains(updated));
        assert!(output.contains("Book deleted: 1"));
        assert!(library.books().is_empty());
    }

    #[test]
    fn test_persistence_failure_is_reported() {
        let mut library = empty_library();
        library.store_mut().backend_mut().set_fail_writes(true);
        let output = run_session(&mut library, b"create\nDune\nHerbert\nexit\n");
        assert!(output.contains("(change kept in memory)"));
        assert_eq!(library.books().len(), 1);
    }
}
